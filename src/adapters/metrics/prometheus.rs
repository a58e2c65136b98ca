//! Prometheus Metrics Registry - Request Observability
//!
//! Counts every venue request by endpoint and outcome and records its
//! latency. Outcomes are the error-variant names, so dashboards can tell
//! rate limiting apart from venue outages.

use std::time::Duration;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::ExchangeError;

/// Request metrics for one exchange client.
///
/// Metric names follow `exchange_*`.
#[derive(Clone)]
pub struct ExchangeMetrics {
    /// Private registry, so several clients can coexist in one process.
    registry: Registry,
    /// Requests by endpoint and outcome.
    pub requests_total: IntCounterVec,
    /// Request latency in seconds.
    pub request_duration: HistogramVec,
}

impl ExchangeMetrics {
    /// Create and register all metrics.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("exchange_requests_total", "Venue requests by endpoint and outcome"),
            &["endpoint", "outcome"],
        )?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "exchange_request_duration_seconds",
                "Venue request latency in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["endpoint"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
        })
    }

    /// Record one finished request.
    pub fn observe(&self, endpoint: &str, elapsed: Duration, error: Option<&ExchangeError>) {
        self.requests_total
            .with_label_values(&[endpoint, outcome(error)])
            .inc();
        self.request_duration
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }

    /// Render the registry in the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

fn outcome(error: Option<&ExchangeError>) -> &'static str {
    match error {
        None => "ok",
        Some(ExchangeError::Network(_)) => "network",
        Some(ExchangeError::Authentication(_)) => "authentication",
        Some(ExchangeError::InvalidRequest(_)) => "invalid_request",
        Some(ExchangeError::BadSymbol { .. }) => "bad_symbol",
        Some(ExchangeError::RateLimited(_)) => "rate_limited",
        Some(ExchangeError::ExchangeUnavailable(_)) => "unavailable",
        Some(ExchangeError::MalformedResponse(_)) => "malformed",
        Some(ExchangeError::EmptyBook { .. }) => "empty_book",
        Some(ExchangeError::Config(_)) => "config",
        Some(ExchangeError::Closed) => "closed",
    }
}
