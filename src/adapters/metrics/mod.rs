//! Metrics Adapters
//!
//! Prometheus counters and histograms for backend requests. Each client
//! owns its own registry; callers scrape it with `gather_text`.

pub mod prometheus;

pub use prometheus::ExchangeMetrics;
