// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake Service
//!
//! Receives contact form submissions from a static portfolio site and
//! forwards them by email through SendGrid.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `SENDGRID_API_KEY`: Provider API key (required to send)
//! - `CONTACT_TO_EMAIL`: Mailbox receiving submissions (required to send)
//! - `SENDGRID_API_URL`: Provider endpoint (default: SendGrid v3 mail/send)
//! - `MAIL_TIMEOUT_MS`: Provider call timeout (default: 5000)
//! - `RATE_LIMIT_MAX`: Submissions per window per client (default: 10)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length (default: 600)
//! - `RATE_LIMIT_SWEEP_SECS`: Idle client sweep interval (default: 60)
//! - `METRICS_ENABLED` / `METRICS_PATH`: Prometheus endpoint (default: on, /metrics)
//! - `CORS_ALLOW_ORIGINS`: Comma-separated origins allowed cross-site

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_intake::{
    config::Config,
    handlers::{router, AppState, Delivery},
    limiter::{now_millis, RateLimiter},
    metrics::ContactMetrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    // The API key is skipped when serializing.
    info!(
        config = %serde_json::to_string(&config)?,
        "Starting contact intake"
    );

    let delivery = Delivery::from_config(&config.mail)?;
    if delivery.is_none() {
        warn!("SENDGRID_API_KEY or CONTACT_TO_EMAIL not set; submissions will be refused");
    }

    let state = Arc::new(AppState {
        limiter: RateLimiter::new(config.rate_limit.clone()),
        delivery,
        metrics: ContactMetrics::new()?,
    });

    // Spawn sweep task
    let sweep_state = state.clone();
    let sweep_interval = config.rate_limit.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            let removed = sweep_state.limiter.sweep(now_millis()).await;
            let tracked = sweep_state.limiter.tracked_clients().await;
            sweep_state.metrics.set_tracked_clients(tracked);
            if removed > 0 {
                debug!(removed, tracked, "Swept idle rate limit entries");
            }
        }
    });

    let app = router(state, &config);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
