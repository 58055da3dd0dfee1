// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound email delivery.
//!
//! [`Mailer`] is the seam between the intake handler and the provider. The
//! production implementation talks to the SendGrid v3 send API; tests plug in
//! their own.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// A message ready to hand to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

impl OutboundEmail {
    /// Build the self-addressed notification for one contact submission.
    pub fn from_submission(mailbox: &str, name: &str, email: &str, message: &str) -> Self {
        Self {
            to: mailbox.to_string(),
            from: mailbox.to_string(),
            subject: format!("Portfolio contact from {name}"),
            body: format!("Name: {name}\nEmail: {email}\n\n{message}"),
        }
    }
}

/// What the provider said about a send that completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The provider accepted the message
    Accepted,
    /// The provider answered with a non-success status
    Rejected {
        status: u16,
        /// Provider response body, for operator logs only
        detail: String,
    },
}

/// Failure to complete the provider call at all.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Email provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Email provider transport error: {0}")]
    Transport(String),
}

/// Sends one message and reports how the provider answered.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<SendOutcome, MailerError>;
}

#[derive(Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct SendGridPersonalization<'a> {
    to: [SendGridAddress<'a>; 1],
}

#[derive(Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendGridPayload<'a> {
    personalizations: [SendGridPersonalization<'a>; 1],
    from: SendGridAddress<'a>,
    subject: &'a str,
    content: [SendGridContent<'a>; 1],
}

impl<'a> From<&'a OutboundEmail> for SendGridPayload<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        Self {
            personalizations: [SendGridPersonalization {
                to: [SendGridAddress { email: &email.to }],
            }],
            from: SendGridAddress { email: &email.from },
            subject: &email.subject,
            content: [SendGridContent {
                kind: "text/plain",
                value: &email.body,
            }],
        }
    }
}

/// SendGrid v3 `mail/send` client.
pub struct SendGridMailer {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    timeout: Duration,
}

impl SendGridMailer {
    /// Create a mailer posting to `endpoint` with the given key and timeout.
    pub fn new(endpoint: Url, api_key: String, timeout: Duration) -> Result<Self, MailerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SendOutcome, MailerError> {
        debug!(endpoint = %self.endpoint, to = %email.to, "Sending contact email");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&SendGridPayload::from(email))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailerError::Timeout(self.timeout)
                } else {
                    MailerError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(SendOutcome::Accepted);
        }

        let detail = response.text().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not read provider error body");
            String::new()
        });
        Ok(SendOutcome::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}
