// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the contact intake service.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Counters and histograms exposed on the metrics route.
#[derive(Clone)]
pub struct ContactMetrics {
    registry: Registry,
    submissions: IntCounterVec,
    provider_latency: Histogram,
    tracked_clients: IntGauge,
}

impl ContactMetrics {
    /// Create a fresh registry with all collectors registered.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_submissions_total",
                "Contact submissions by final outcome",
            ),
            &["outcome"],
        )?;
        let provider_latency = Histogram::with_opts(
            HistogramOpts::new(
                "contact_provider_latency_seconds",
                "Time spent waiting on the email provider",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        let tracked_clients = IntGauge::new(
            "contact_rate_limit_clients",
            "Client identifiers currently held by the rate limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(provider_latency.clone()))?;
        registry.register(Box::new(tracked_clients.clone()))?;

        Ok(Self {
            registry,
            submissions,
            provider_latency,
            tracked_clients,
        })
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    pub fn observe_provider_latency(&self, seconds: f64) {
        self.provider_latency.observe(seconds);
    }

    pub fn set_tracked_clients(&self, clients: usize) {
        self.tracked_clients.set(i64::try_from(clients).unwrap_or(i64::MAX));
    }

    pub fn outcome_count(&self, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[outcome]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
