//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) between callers, venue adapters and
//! connectivity backends. Adapters implement these traits.
//!
//! Port categories:
//! - `Exchange`: Uniform market-data and order-management interface
//! - `ExchangeBackend`: Connectivity client a venue adapter delegates to

pub mod backend;
pub mod exchange;

pub use backend::ExchangeBackend;
pub use exchange::Exchange;
