// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact intake service.
//!
//! One submission runs through validation, the configuration check, the rate
//! limiter and the provider call in that order. Every failure becomes a
//! [`ContactError`] and leaves as a JSON `{ "error": ... }` response.

use crate::config::{Config, MailConfig};
use crate::error::{ContactError, Result};
use crate::limiter::{now_millis, RateLimitResult, RateLimiter};
use crate::mailer::{Mailer, OutboundEmail, SendGridMailer, SendOutcome};
use crate::metrics::ContactMetrics;
use crate::validator::{self, ContactSubmission};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

/// Route the contact form posts to.
pub const CONTACT_PATH: &str = "/api/send-contact";

/// Header carrying the original client address behind a proxy.
const FORWARDED_FOR: &str = "x-forwarded-for";

/// A configured way to deliver submissions.
pub struct Delivery {
    pub mailer: Arc<dyn Mailer>,
    /// Mailbox that both sends and receives the notification
    pub mailbox: String,
}

impl Delivery {
    /// Build the SendGrid delivery, or `None` when the secrets are missing.
    pub fn from_config(config: &MailConfig) -> anyhow::Result<Option<Self>> {
        let Some(credentials) = config.credentials() else {
            return Ok(None);
        };

        let mailer =
            SendGridMailer::new(config.endpoint()?, credentials.api_key, config.timeout())?;
        Ok(Some(Self {
            mailer: Arc::new(mailer),
            mailbox: credentials.to_email,
        }))
    }
}

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub delivery: Option<Delivery>,
    pub metrics: ContactMetrics,
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>, config: &Config) -> Router {
    let mut contact = Router::new().route(
        CONTACT_PATH,
        post(send_contact).fallback(method_not_allowed),
    );
    if let Some(cors) = cors_layer(&config.cors_allow_origins) {
        contact = contact.layer(cors);
    }

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .merge(contact);

    if config.metrics.enabled {
        let path = if config.metrics.path.starts_with('/') {
            config.metrics.path.clone()
        } else {
            format!("/{}", config.metrics.path)
        };
        app = app.route(&path, get(metrics));
    }

    app.layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "Handler panicked");
    ContactError::Internal(detail.to_string()).into_response()
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Any method other than POST on the contact route.
pub async fn method_not_allowed(
    State(state): State<Arc<AppState>>,
    method: Method,
) -> ContactError {
    debug!(%method, "Rejecting non-POST contact request");
    let err = ContactError::MethodNotAllowed;
    state.metrics.record_outcome(err.outcome());
    err
}

/// Accept a contact form submission and forward it by email.
pub async fn send_contact(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let client = client_identifier(&headers, peer);

    match intake(&state, &client, &body).await {
        Ok(()) => {
            state.metrics.record_outcome("sent");
            (
                StatusCode::OK,
                Json(SuccessResponse {
                    message: "Message sent successfully",
                }),
            )
                .into_response()
        }
        Err(err) => {
            state.metrics.record_outcome(err.outcome());
            match &err {
                ContactError::Upstream { .. } | ContactError::Internal(_) => {
                    error!(client = %client, error = %err, "Contact submission failed")
                }
                ContactError::NotConfigured => {
                    error!(error = %err, "SENDGRID_API_KEY or CONTACT_TO_EMAIL is not set")
                }
                _ => info!(client = %client, error = %err, "Contact submission rejected"),
            }
            err.into_response()
        }
    }
}

async fn intake(state: &AppState, client: &str, body: &[u8]) -> Result<()> {
    let submission = ContactSubmission::from_body(body);
    let contact = validator::validate(&submission)?;

    let delivery = state.delivery.as_ref().ok_or(ContactError::NotConfigured)?;

    if let RateLimitResult::Limited { retry_after } =
        state.limiter.check(client, now_millis()).await
    {
        return Err(ContactError::RateLimited { retry_after });
    }

    let email = OutboundEmail::from_submission(
        &delivery.mailbox,
        contact.name,
        contact.email,
        contact.message,
    );

    let started = Instant::now();
    let outcome = delivery.mailer.send(&email).await;
    state
        .metrics
        .observe_provider_latency(started.elapsed().as_secs_f64());

    match outcome {
        Ok(SendOutcome::Accepted) => {
            info!(client = %client, "Contact email sent");
            Ok(())
        }
        Ok(SendOutcome::Rejected { status, detail }) => {
            warn!(status, detail = %detail, "Email provider rejected message");
            Err(ContactError::Upstream { status })
        }
        Err(err) => Err(ContactError::Internal(err.to_string())),
    }
}

/// Derive the rate-limit key for a request.
///
/// Uses the first `X-Forwarded-For` entry, then the peer address, then
/// `"unknown"`.
pub fn client_identifier(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(first), _) => first.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}
