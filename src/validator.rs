// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact submission validator.
//!
//! Checks run in a fixed order and the first failure wins:
//! - Honeypot field must be empty
//! - Name, email and message must be present and non-empty
//! - Email must pass a permissive syntactic check

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// A contact form submission as posted by the browser.
#[derive(Debug, Clone, Default)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    /// Hidden honeypot field; humans leave it empty.
    pub hp: Option<String>,
}

impl ContactSubmission {
    /// Parse a request body.
    ///
    /// Anything that is not a JSON object yields an empty submission, which
    /// then fails the required-field check. Non-string values count as absent,
    /// except in the honeypot, where any truthy value counts as filled.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Self::from_fields(&fields),
            Ok(_) => {
                debug!("Contact body is not a JSON object");
                Self::default()
            }
            Err(err) => {
                debug!(error = %err, "Unparseable contact body");
                Self::default()
            }
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: text("name"),
            email: text("email"),
            message: text("message"),
            hp: fields.get("hp").and_then(honeypot_text),
        }
    }
}

fn honeypot_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Validation error types.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Honeypot field was filled in")]
    SpamDetected,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Email address failed syntax check")]
    InvalidEmail,
}

/// The required fields of a submission that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidContact<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Validate a submission.
pub fn validate(submission: &ContactSubmission) -> Result<ValidContact<'_>, ValidationError> {
    if submission.hp.as_deref().is_some_and(|hp| !hp.is_empty()) {
        debug!("Honeypot field filled");
        return Err(ValidationError::SpamDetected);
    }

    let name = required(submission.name.as_deref(), "name")?;
    let email = required(submission.email.as_deref(), "email")?;
    let message = required(submission.message.as_deref(), "message")?;

    if !is_valid_email(email) {
        debug!("Email failed syntax check");
        return Err(ValidationError::InvalidEmail);
    }

    Ok(ValidContact {
        name,
        email,
        message,
    })
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => {
            debug!(field, "Missing required field");
            Err(ValidationError::MissingField(field))
        }
    }
}

/// Syntactic address check: `local@domain.tld` with no whitespace and a
/// single `@`. Not RFC 5322 validation.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(is_space) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // A dot with at least one character on each side.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Whitespace as matched by an ECMAScript `\s`: Unicode `White_Space`
/// without NEL, plus the byte order mark.
fn is_space(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}
