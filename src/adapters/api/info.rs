//! Info Responses - Unified Market and Account Records
//!
//! Converts typed `/info` payloads into the loosely typed records the
//! backend port hands to venue adapters. Prices arrive as decimal
//! strings and leave as JSON numbers. Fields the venue omits become
//! `null`; the adapter decides whether that is fatal.

use serde_json::{Value, json};

use super::types::{AssetCtx, Candle, L2Book, L2Level, PerpPosition};
use crate::error::{ExchangeError, Result};

/// Candle intervals the venue serves, with their length in milliseconds.
const INTERVALS: &[(&str, i64)] = &[
    ("1m", 60_000),
    ("3m", 180_000),
    ("5m", 300_000),
    ("15m", 900_000),
    ("30m", 1_800_000),
    ("1h", 3_600_000),
    ("2h", 7_200_000),
    ("4h", 14_400_000),
    ("8h", 28_800_000),
    ("12h", 43_200_000),
    ("1d", 86_400_000),
    ("3d", 259_200_000),
    ("1w", 604_800_000),
    ("1M", 2_592_000_000),
];

/// Length of a candle interval, or `InvalidRequest` if unsupported.
pub fn timeframe_ms(timeframe: &str) -> Result<i64> {
    INTERVALS
        .iter()
        .find(|(name, _)| *name == timeframe)
        .map(|(_, ms)| *ms)
        .ok_or_else(|| ExchangeError::InvalidRequest(format!("unsupported timeframe: {timeframe}")))
}

/// `{symbol, bids, asks, timestamp}`; `levels[0]` is bids, `levels[1]` asks.
pub fn unify_order_book(symbol: &str, book: &L2Book) -> Result<Value> {
    let side = |index: usize| -> Result<Vec<Value>> {
        book.levels
            .get(index)
            .map_or_else(|| Ok(Vec::new()), |levels| levels.iter().map(level).collect())
    };

    Ok(json!({
        "symbol": symbol,
        "bids": side(0)?,
        "asks": side(1)?,
        "timestamp": book.time,
    }))
}

fn level(level: &L2Level) -> Result<Value> {
    Ok(json!([decimal(&level.px, "px")?, decimal(&level.sz, "sz")?]))
}

/// `{symbol, last, bid, ask, mark, info}`.
///
/// `last` is the mid, or the mark price when the book is one-sided.
/// Bid and ask are the impact prices.
pub fn unify_ticker(symbol: &str, ctx: &AssetCtx) -> Result<Value> {
    let mid = optional(ctx.mid_px.as_deref(), "midPx")?;
    let mark = optional(ctx.mark_px.as_deref(), "markPx")?;
    let impact = |index: usize| {
        optional(
            ctx.impact_pxs
                .as_ref()
                .and_then(|pxs| pxs.get(index))
                .map(String::as_str),
            "impactPxs",
        )
    };

    Ok(json!({
        "symbol": symbol,
        "last": mid.or(mark),
        "bid": impact(0)?,
        "ask": impact(1)?,
        "mark": mark,
        "info": {
            "midPx": ctx.mid_px,
            "markPx": ctx.mark_px,
            "oraclePx": ctx.oracle_px,
            "funding": ctx.funding,
            "openInterest": ctx.open_interest,
        },
    }))
}

/// `{symbol, side, contracts, entryPrice, unrealizedPnl, leverage, info}`.
///
/// A flat position still yields a record, with `contracts` 0 and a null side.
pub fn unify_position(symbol: &str, position: &PerpPosition) -> Result<Value> {
    let szi = decimal(&position.szi, "szi")?;
    let side = if szi > 0.0 {
        Value::from("long")
    } else if szi < 0.0 {
        Value::from("short")
    } else {
        Value::Null
    };

    Ok(json!({
        "symbol": symbol,
        "side": side,
        "contracts": szi.abs(),
        "entryPrice": optional(position.entry_px.as_deref(), "entryPx")?,
        "unrealizedPnl": optional(position.unrealized_pnl.as_deref(), "unrealizedPnl")?,
        "leverage": position.leverage.as_ref().map(|l| l.value),
        "info": {
            "coin": position.coin,
            "szi": position.szi,
            "positionValue": position.position_value,
            "liquidationPx": position.liquidation_px,
        },
    }))
}

/// `[t, o, h, l, c, v]`.
pub fn unify_candle(candle: &Candle) -> Result<Value> {
    Ok(json!([
        candle.open_time,
        decimal(&candle.open, "o")?,
        decimal(&candle.high, "h")?,
        decimal(&candle.low, "l")?,
        decimal(&candle.close, "c")?,
        decimal(&candle.volume, "v")?,
    ]))
}

fn decimal(raw: &str, field: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ExchangeError::MalformedResponse(format!("{field} is not a number: {raw:?}")))
}

fn optional(raw: Option<&str>, field: &str) -> Result<Option<f64>> {
    raw.map(|value| decimal(value, field)).transpose()
}
