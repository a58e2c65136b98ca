//! Market Metadata - Symbol Resolution and Wire Precision
//!
//! Maps unified symbols ("BTC/USDC:USDC") to Hyperliquid coins and
//! asset indices, and rounds prices/sizes to what the venue accepts:
//! at most 5 significant figures and `6 - szDecimals` decimals for
//! prices, `szDecimals` decimals for sizes.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tokio::sync::RwLock;
use tracing::debug;

use super::types::Meta;
use crate::error::{ExchangeError, Result};

/// Quote and settlement currency of every perpetual.
const SETTLE: &str = "USDC";

/// Maximum decimals for perpetual prices before subtracting szDecimals.
const MAX_PERP_DECIMALS: u32 = 6;

/// Significant figures allowed in a price.
const PRICE_SIG_FIGS: u32 = 5;

/// One tradable perpetual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerpMarket {
    /// Unified symbol, e.g. "BTC/USDC:USDC".
    pub symbol: String,
    /// Venue coin name, e.g. "BTC".
    pub coin: String,
    /// Asset index used in actions.
    pub asset: u32,
    /// Size precision.
    pub sz_decimals: u32,
}

/// Unified symbol for a perpetual coin.
pub fn perp_symbol(coin: &str) -> String {
    format!("{coin}/{SETTLE}:{SETTLE}")
}

/// Markets loaded at connect time, keyed by symbol.
#[derive(Debug, Default)]
pub struct MarketCache {
    by_symbol: RwLock<HashMap<String, PerpMarket>>,
}

impl MarketCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache from a `meta` response. Returns the market count.
    pub async fn replace(&self, meta: &Meta) -> usize {
        let markets: HashMap<String, PerpMarket> = meta
            .universe
            .iter()
            .zip(0u32..)
            .filter(|(asset, _)| !asset.is_delisted.unwrap_or(false))
            .map(|(asset, index)| {
                let market = PerpMarket {
                    symbol: perp_symbol(&asset.name),
                    coin: asset.name.clone(),
                    asset: index,
                    sz_decimals: asset.sz_decimals,
                };
                (market.symbol.clone(), market)
            })
            .collect();

        let count = markets.len();
        *self.by_symbol.write().await = markets;
        debug!(markets = count, "Market cache replaced");
        count
    }

    /// Look up a market, failing with `BadSymbol` if it is unknown.
    pub async fn get(&self, symbol: &str) -> Result<PerpMarket> {
        self.by_symbol
            .read()
            .await
            .get(symbol)
            .cloned()
            .ok_or_else(|| ExchangeError::BadSymbol {
                symbol: symbol.to_string(),
            })
    }

    /// Reverse lookup from a venue coin to its market.
    pub async fn by_coin(&self, coin: &str) -> Option<PerpMarket> {
        self.by_symbol.read().await.get(&perp_symbol(coin)).cloned()
    }

    pub async fn is_empty(&self) -> bool {
        self.by_symbol.read().await.is_empty()
    }
}

/// Round a price to venue precision and render it for the wire.
pub fn price_to_wire(price: f64, sz_decimals: u32) -> Result<String> {
    let max_decimals = MAX_PERP_DECIMALS.saturating_sub(sz_decimals);
    let rounded = to_decimal(price, "price")?
        .round_sf(PRICE_SIG_FIGS)
        .ok_or_else(|| ExchangeError::InvalidRequest(format!("price {price} out of range")))?
        .round_dp(max_decimals);
    if rounded <= Decimal::ZERO {
        return Err(ExchangeError::InvalidRequest(format!(
            "price {price} rounds to {rounded}"
        )));
    }
    Ok(rounded.normalize().to_string())
}

/// Round a size to `sz_decimals` and render it for the wire.
pub fn size_to_wire(amount: f64, sz_decimals: u32) -> Result<String> {
    let rounded = to_decimal(amount, "amount")?.round_dp(sz_decimals);
    if rounded <= Decimal::ZERO {
        return Err(ExchangeError::InvalidRequest(format!(
            "amount {amount} rounds to {rounded} at {sz_decimals} decimals"
        )));
    }
    Ok(rounded.normalize().to_string())
}

/// Rounded price as f64, for slippage arithmetic.
pub fn round_price(price: f64, sz_decimals: u32) -> Result<f64> {
    price_to_wire(price, sz_decimals)?
        .parse::<Decimal>()
        .ok()
        .and_then(|d| d.to_f64())
        .ok_or_else(|| ExchangeError::InvalidRequest(format!("price {price} out of range")))
}

fn to_decimal(value: f64, what: &str) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(ExchangeError::InvalidRequest(format!("{what} must be finite")));
    }
    Decimal::from_f64(value)
        .ok_or_else(|| ExchangeError::InvalidRequest(format!("{what} {value} out of range")))
}
