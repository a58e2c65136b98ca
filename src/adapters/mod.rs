//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies. Each sub-module groups adapters by concern.
//!
//! Adapter categories:
//! - `api`: Hyperliquid REST client, signing, and wire types
//! - `hyperliquid`: `Exchange` implementation reshaping backend records
//! - `metrics`: Prometheus request metrics

pub mod api;
pub mod hyperliquid;
pub mod metrics;

pub use hyperliquid::HyperliquidExchange;
