//! Exchange Core — Library Root
//!
//! A uniform async exchange interface (`Exchange`) with a Hyperliquid
//! perpetuals adapter. Re-exports all modules for integration tests and
//! benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use adapters::HyperliquidExchange;
pub use config::ExchangeConfig;
pub use error::{ExchangeError, Result};
pub use ports::{Exchange, ExchangeBackend};
