//! Hyperliquid Venue Adapter - `Exchange` over an `ExchangeBackend`
//!
//! Every operation is a single backend call followed by reshaping into
//! domain values. Backend errors pass through unchanged. The adapter
//! keeps no state of its own; closing is delegated to the backend.

pub mod reshape;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::adapters::api::HyperliquidClient;
use crate::config::ExchangeConfig;
use crate::domain::{Ohlcv, Order, OrderSide, OrderType, Orderbook, Position, Ticker};
use crate::error::Result;
use crate::ports::{Exchange, ExchangeBackend};

/// Hyperliquid perpetuals behind the uniform `Exchange` interface.
pub struct HyperliquidExchange<B: ExchangeBackend = HyperliquidClient> {
    backend: B,
}

impl<B: ExchangeBackend> HyperliquidExchange<B> {
    /// Wrap an already-configured backend. Performs no I/O.
    pub const fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    async fn place(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: f64,
        price: Option<f64>,
    ) -> Result<Order> {
        let response = self
            .backend
            .create_order(symbol, order_type, side, amount, price)
            .await?;
        let id = reshape::id_string(response.get("id").unwrap_or(&serde_json::Value::Null))?;
        debug!(symbol, id = %id, kind = order_type.as_str(), "Order placed");

        // Echo what was submitted; only the id is confirmed by the venue.
        Ok(Order {
            id,
            symbol: symbol.to_string(),
            side,
            amount,
            price,
        })
    }
}

#[async_trait]
impl<B: ExchangeBackend> Exchange for HyperliquidExchange<B> {
    #[instrument(skip(config), fields(testnet = config.testnet))]
    async fn create(config: ExchangeConfig) -> Result<Self> {
        let backend = B::from_config(&config)?;
        backend.load_markets().await?;
        info!("Exchange ready");
        Ok(Self::with_backend(backend))
    }

    #[instrument(skip(self))]
    async fn get_orderbook(&self, symbol: &str) -> Result<Orderbook> {
        let raw = self.backend.fetch_order_book(symbol).await?;
        let book = reshape::orderbook(&raw)?;
        debug!(asks = book.asks.len(), bids = book.bids.len(), "Order book fetched");
        Ok(book)
    }

    #[instrument(skip(self))]
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker> {
        let raw = self.backend.fetch_ticker(symbol).await?;
        let ticker = reshape::ticker(symbol, &raw)?;
        debug!(last = ticker.last, bid = ticker.bid, ask = ticker.ask, "Ticker fetched");
        Ok(ticker)
    }

    #[instrument(skip(self))]
    async fn get_position(&self, symbol: &str) -> Result<Position> {
        let records = self.backend.fetch_positions(&[symbol.to_string()]).await?;
        let position = reshape::position(symbol, &records)?;
        debug!(side = ?position.side, size = position.size, "Position fetched");
        Ok(position)
    }

    #[instrument(skip(self))]
    async fn place_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        amount: f64,
        price: f64,
    ) -> Result<Order> {
        self.place(symbol, OrderType::Limit, side, amount, Some(price))
            .await
    }

    #[instrument(skip(self))]
    async fn place_market_order(&self, symbol: &str, side: OrderSide, amount: f64) -> Result<Order> {
        self.place(symbol, OrderType::Market, side, amount, None)
            .await
    }

    #[instrument(skip(self))]
    async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<()> {
        self.backend.cancel_order(order_id, symbol).await?;
        debug!("Order cancel requested");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_ohlcv(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<Vec<Ohlcv>> {
        let rows = self.backend.fetch_ohlcv(symbol, timeframe, limit).await?;
        let candles = reshape::candles(&rows)?;
        debug!(candles = candles.len(), "Candles fetched");
        Ok(candles)
    }

    #[instrument(skip(self))]
    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>> {
        let rows = self.backend.fetch_open_orders(symbol).await?;
        let orders = rows
            .iter()
            .map(reshape::open_order)
            .collect::<Result<Vec<_>>>()?;
        debug!(orders = orders.len(), "Open orders fetched");
        Ok(orders)
    }

    #[instrument(skip(self))]
    async fn close(&self) -> Result<()> {
        self.backend.close().await?;
        debug!("Exchange closed");
        Ok(())
    }
}
