// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact intake service.
//!
//! Every value can be set from the environment; see [`Config::from_env`].
//! The provider secrets are optional at startup. A service without them still
//! answers requests, it just refuses to send.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default SendGrid v3 send endpoint.
pub const DEFAULT_SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Configuration for the contact intake service.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    pub bind_addr: String,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Email provider configuration
    pub mail: MailConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,

    /// Origins allowed to call the contact route cross-site. Empty disables CORS.
    pub cors_allow_origins: Vec<String>,
}

/// Sliding-window rate limiting configuration.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per client within the window (default: 10)
    pub max_requests: usize,

    /// Trailing window length in seconds (default: 600)
    pub window_secs: u64,

    /// How often idle clients are swept from memory, in seconds (default: 60)
    pub sweep_interval_secs: u64,
}

/// Email provider configuration.
#[derive(Clone, Serialize)]
pub struct MailConfig {
    /// Provider API key (`SENDGRID_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Mailbox that receives submissions (`CONTACT_TO_EMAIL`)
    pub to_email: Option<String>,

    /// Provider send endpoint
    pub api_url: String,

    /// Upper bound on the provider call, in milliseconds (default: 5000)
    pub timeout_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> usize {
    10
}

fn default_window_secs() -> u64 {
    10 * 60
}

fn default_sweep_secs() -> u64 {
    60
}

fn default_api_url() -> String {
    DEFAULT_SENDGRID_API_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
            cors_allow_origins: Vec::new(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            sweep_interval_secs: default_sweep_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            to_email: None,
            api_url: default_api_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("to_email", &self.to_email)
            .field("api_url", &self.api_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl RateLimitConfig {
    /// Get the trailing window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// Provider credentials, present only when both secrets are set.
#[derive(Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub api_key: String,
    pub to_email: String,
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("api_key", &"<redacted>")
            .field("to_email", &self.to_email)
            .finish()
    }
}

impl MailConfig {
    /// Both secrets, or `None` when either is unset or empty.
    pub fn credentials(&self) -> Option<MailCredentials> {
        let api_key = self.api_key.as_deref().filter(|k| !k.is_empty())?;
        let to_email = self.to_email.as_deref().filter(|e| !e.is_empty())?;
        Some(MailCredentials {
            api_key: api_key.to_string(),
            to_email: to_email.to_string(),
        })
    }

    /// Get the provider call timeout. Zero means the default.
    pub fn timeout(&self) -> Duration {
        match self.timeout_ms {
            0 => Duration::from_millis(default_timeout_ms()),
            ms => Duration::from_millis(ms),
        }
    }

    /// Parse the configured provider endpoint.
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.api_url)
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(default_bind_addr),
            rate_limit: RateLimitConfig {
                max_requests: parse_var(&lookup, "RATE_LIMIT_MAX")
                    .unwrap_or_else(default_max_requests),
                window_secs: parse_var(&lookup, "RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or_else(default_window_secs),
                sweep_interval_secs: parse_var(&lookup, "RATE_LIMIT_SWEEP_SECS")
                    .unwrap_or_else(default_sweep_secs),
            },
            mail: MailConfig {
                api_key: lookup("SENDGRID_API_KEY"),
                to_email: lookup("CONTACT_TO_EMAIL"),
                api_url: lookup("SENDGRID_API_URL").unwrap_or_else(default_api_url),
                timeout_ms: parse_var(&lookup, "MAIL_TIMEOUT_MS")
                    .unwrap_or_else(default_timeout_ms),
            },
            metrics: MetricsConfig {
                enabled: lookup("METRICS_ENABLED")
                    .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no"))
                    .unwrap_or_else(default_true),
                path: lookup("METRICS_PATH").unwrap_or_else(default_metrics_path),
            },
            cors_allow_origins: lookup("CORS_ALLOW_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
