// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake
//!
//! Backend for a static portfolio site's contact form:
//!
//! - Honeypot spam check
//! - Required field and email syntax validation
//! - Per-client sliding-window rate limiting (10 per 10 minutes)
//! - Delivery through the SendGrid v3 send API

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod validator;

pub use config::Config;
pub use error::ContactError;
pub use limiter::{RateLimitResult, RateLimiter};
pub use mailer::{Mailer, OutboundEmail, SendOutcome};
pub use validator::{ContactSubmission, ValidationError};
