//! Exchange Port - Uniform Venue Interface
//!
//! The capability set every venue adapter implements: market data
//! queries, order placement and cancellation, and an explicit teardown.
//! Failures are whatever the backend raised; adapters do not translate
//! them.

use async_trait::async_trait;

use crate::config::ExchangeConfig;
use crate::domain::{Ohlcv, Order, OrderSide, Orderbook, Position, Ticker};
use crate::error::Result;

/// Trait for venue adapters.
///
/// Every method other than `create` takes `&self`, so independent calls
/// may be issued concurrently (e.g. order book and ticker joined
/// together). No ordering is imposed between them.
#[async_trait]
pub trait Exchange: Send + Sync + 'static {
  /// Connect to the venue and load market metadata.
  ///
  /// An async factory rather than a constructor: the instance is only
  /// usable after the metadata round-trip completes.
  async fn create(config: ExchangeConfig) -> Result<Self>
  where
    Self: Sized;

  /// Current order book snapshot.
  async fn get_orderbook(&self, symbol: &str) -> Result<Orderbook>;

  /// Current last/bid/ask.
  async fn get_ticker(&self, symbol: &str) -> Result<Ticker>;

  /// Current position for `symbol`.
  ///
  /// Returns `Position::flat` when no position exists or its size is
  /// zero; a missing position is not an error.
  async fn get_position(&self, symbol: &str) -> Result<Position>;

  /// Submit a resting order. The returned order echoes `price`.
  async fn place_limit_order(
    &self,
    symbol: &str,
    side: OrderSide,
    amount: f64,
    price: f64,
  ) -> Result<Order>;

  /// Submit an immediately-matched order. The returned price is `None`.
  async fn place_market_order(&self, symbol: &str, side: OrderSide, amount: f64) -> Result<Order>;

  /// Request cancellation. No final order state is returned.
  async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<()>;

  /// Most recent `limit` candles, oldest first.
  ///
  /// `timeframe` is a venue string such as "1m", "5m" or "1h".
  async fn get_ohlcv(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<Vec<Ohlcv>>;

  /// All unfilled orders for `symbol`.
  async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>>;

  /// Release the backend connection.
  async fn close(&self) -> Result<()>;
}
