//! Domain layer - Exchange data model.
//!
//! Plain value snapshots returned by the exchange interface. Nothing here
//! performs I/O; the only behavior is the order book's best-price
//! accessors.

pub mod market;
pub mod trade;

// Re-export core types for convenience
pub use market::{Ohlcv, Orderbook, Ticker};
pub use trade::{Order, OrderId, OrderSide, OrderType, Position, PositionSide, Symbol};
