//! Backend Port - Exchange Connectivity Client
//!
//! The seam between the venue adapter and the library doing the actual
//! transport, signing and rate limiting. Responses are unified,
//! loosely typed JSON records: numbers may arrive as strings, ids as
//! integers. Reshaping them is the adapter's job.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ExchangeConfig;
use crate::domain::{OrderSide, OrderType};
use crate::error::Result;

/// Trait for exchange connectivity backends.
///
/// Record shapes:
/// - order book: `{symbol, asks: [[px, sz]..], bids: [[px, sz]..], timestamp}`
/// - ticker: `{symbol, last, bid, ask, ...}`
/// - position: `{symbol, side: "long"|"short"|null, contracts, entryPrice, unrealizedPnl, ...}`
/// - order: `{id, symbol, side, amount, price, status, ...}`
/// - candle: `[timestamp, open, high, low, close, volume]`
#[async_trait]
pub trait ExchangeBackend: Send + Sync + Sized + 'static {
  /// Build the client from configuration. Performs no I/O.
  fn from_config(config: &ExchangeConfig) -> Result<Self>;

  /// Fetch and cache market metadata.
  async fn load_markets(&self) -> Result<()>;

  async fn fetch_order_book(&self, symbol: &str) -> Result<Value>;

  async fn fetch_ticker(&self, symbol: &str) -> Result<Value>;

  /// Positions for the given symbols (possibly including zero-size ones).
  async fn fetch_positions(&self, symbols: &[String]) -> Result<Vec<Value>>;

  /// Submit an order. `price` is required for limit orders.
  async fn create_order(
    &self,
    symbol: &str,
    order_type: OrderType,
    side: OrderSide,
    amount: f64,
    price: Option<f64>,
  ) -> Result<Value>;

  async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<Value>;

  async fn fetch_ohlcv(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<Vec<Value>>;

  async fn fetch_open_orders(&self, symbol: &str) -> Result<Vec<Value>>;

  /// Release transport resources.
  async fn close(&self) -> Result<()>;
}
