// SPDX-License-Identifier: Apache-2.0
//! Error types for the contact intake handler

use crate::validator::ValidationError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Every way a contact submission can fail.
///
/// `Display` is for logs. Clients only ever see [`ContactError::public_message`].
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid submission: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Email service not configured")]
    NotConfigured,

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Email provider rejected the message with status {status}")]
    Upstream { status: u16 },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// The fixed message returned to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::Invalid(ValidationError::SpamDetected) => "Spam detected",
            Self::Invalid(ValidationError::MissingField(_)) => "Missing required fields",
            Self::Invalid(ValidationError::InvalidEmail) => "Invalid email address",
            Self::NotConfigured => {
                "Email service not configured. Set SENDGRID_API_KEY and CONTACT_TO_EMAIL."
            }
            Self::RateLimited { .. } => "Too many requests. Please try again later.",
            Self::Upstream { .. } => "Email service error",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Label used for the submissions counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::Invalid(ValidationError::SpamDetected) => "spam",
            Self::Invalid(_) => "invalid",
            Self::NotConfigured => "not_configured",
            Self::RateLimited { .. } => "rate_limited",
            Self::Upstream { .. } => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.public_message(),
        });
        let mut response = (self.status(), body).into_response();

        match &self {
            Self::MethodNotAllowed => {
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static("POST"));
            }
            Self::RateLimited { retry_after } => {
                // Round up so clients never retry a moment too early.
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            }
            _ => {}
        }

        response
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ContactError>;
