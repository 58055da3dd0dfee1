// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter for contact submissions.
//!
//! Each client identifier owns the list of its submission timestamps inside
//! the trailing window. A request is recorded before it is judged, so a client
//! that keeps sending while blocked keeps its own window full.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining submissions in the current window
        remaining: usize,
        /// Time until the oldest recorded submission leaves the window
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until a further submission would be allowed
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Thread-safe sliding-window rate limiter keyed by client identifier.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-client submission timestamps, oldest first
    windows: Arc<Mutex<HashMap<String, Vec<i64>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn window_ms(&self) -> i64 {
        i64::try_from(self.config.window_duration().as_millis()).unwrap_or(i64::MAX)
    }

    /// Drop expired timestamps for `client`, append `now_ms` and return the
    /// resulting in-window count.
    pub async fn check_and_record(&self, client: &str, now_ms: i64) -> usize {
        let mut windows = self.windows.lock().await;
        let window = self.window_ms();
        record(windows.entry(client.to_string()).or_default(), now_ms, window)
    }

    /// Record a submission for `client` and decide whether it may proceed.
    pub async fn check(&self, client: &str, now_ms: i64) -> RateLimitResult {
        let mut windows = self.windows.lock().await;
        let window = self.window_ms();
        let limit = self.config.max_requests;

        let timestamps = windows.entry(client.to_string()).or_default();
        let count = record(timestamps, now_ms, window);

        if count <= limit {
            let oldest = timestamps[0];
            return RateLimitResult::Allowed {
                remaining: limit - count,
                reset_in: millis_until(oldest.saturating_add(window), now_ms),
            };
        }

        // The next submission fits once all but `limit - 1` of the recorded
        // timestamps have expired.
        let blocking = timestamps.get(count - limit).copied().unwrap_or(now_ms);
        let retry_after = millis_until(blocking.saturating_add(window), now_ms);
        debug!(client = %client, count, ?retry_after, "Client rate limit exceeded");
        RateLimitResult::Limited { retry_after }
    }

    /// Remove clients whose every recorded submission has left the window.
    ///
    /// Returns the number of clients removed.
    pub async fn sweep(&self, now_ms: i64) -> usize {
        let mut windows = self.windows.lock().await;
        let window = self.window_ms();
        let before = windows.len();
        windows.retain(|_, timestamps| {
            timestamps.retain(|ts| now_ms - ts < window);
            !timestamps.is_empty()
        });
        before - windows.len()
    }

    /// Number of client identifiers currently held in memory.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }
}

fn record(timestamps: &mut Vec<i64>, now_ms: i64, window_ms: i64) -> usize {
    timestamps.retain(|ts| now_ms - ts < window_ms);
    // Callers read the clock before taking the lock, so a late arrival can
    // carry an older timestamp than the newest one recorded.
    let at = timestamps.partition_point(|&ts| ts <= now_ms);
    timestamps.insert(at, now_ms);
    timestamps.len()
}

fn millis_until(deadline_ms: i64, now_ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(deadline_ms.saturating_sub(now_ms)).unwrap_or(0))
}
