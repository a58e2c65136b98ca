//! Market data snapshots: ticker, order book, candles.

use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, Result};

/// Best bid/ask and last traded price for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Unified symbol, e.g. "BTC/USDC:USDC".
    pub symbol: String,
    /// Last traded price.
    pub last: f64,
    /// Best bid.
    pub bid: f64,
    /// Best ask.
    pub ask: f64,
}

/// Order book snapshot as `[price, amount]` levels.
///
/// Asks are ascending and bids descending. Ordering comes from the
/// backend and is never re-sorted here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Orderbook {
    /// Ask levels, lowest price first.
    pub asks: Vec<[f64; 2]>,
    /// Bid levels, highest price first.
    pub bids: Vec<[f64; 2]>,
}

impl Orderbook {
    /// Price of the first ask level.
    pub fn best_ask(&self) -> Result<f64> {
        self.asks
            .first()
            .map(|level| level[0])
            .ok_or(ExchangeError::EmptyBook { side: "asks" })
    }

    /// Price of the first bid level.
    pub fn best_bid(&self) -> Result<f64> {
        self.bids
            .first()
            .map(|level| level[0])
            .ok_or(ExchangeError::EmptyBook { side: "bids" })
    }
}

/// One candlestick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Candle open time, epoch milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
