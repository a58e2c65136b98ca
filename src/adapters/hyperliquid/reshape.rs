//! Backend record reshaping.
//!
//! Pure functions from unified backend JSON to domain values. Numbers
//! may arrive as JSON numbers or numeric strings; both are accepted.

use serde_json::Value;

use crate::domain::{Ohlcv, Order, OrderSide, Orderbook, Position, PositionSide, Ticker};
use crate::error::{ExchangeError, Result};

/// Coerce a JSON number or numeric string to f64.
pub fn to_f64(value: &Value, field: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| malformed(field, value)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| malformed(field, value)),
        _ => Err(malformed(field, value)),
    }
}

/// Required numeric field of a record.
pub fn number(record: &Value, field: &str) -> Result<f64> {
    to_f64(record.get(field).unwrap_or(&Value::Null), field)
}

/// Numeric field where null or missing means zero.
pub fn number_or_zero(record: &Value, field: &str) -> Result<f64> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => to_f64(value, field),
    }
}

/// Coerce to i64; floats are truncated.
pub fn integer(value: &Value, field: &str) -> Result<i64> {
    if let Some(i) = value.as_i64() {
        return Ok(i);
    }
    let float = to_f64(value, field)?;
    #[allow(clippy::cast_possible_truncation)]
    let truncated = float as i64;
    Ok(truncated)
}

/// Order ids come back as integers or strings; always hand out strings.
pub fn id_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(malformed("id", value)),
    }
}

pub fn orderbook(raw: &Value) -> Result<Orderbook> {
    Ok(Orderbook {
        asks: levels(raw, "asks")?,
        bids: levels(raw, "bids")?,
    })
}

fn levels(raw: &Value, field: &str) -> Result<Vec<[f64; 2]>> {
    raw.get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(field, raw.get(field).unwrap_or(&Value::Null)))?
        .iter()
        .map(|level| match level.as_array().map(Vec::as_slice) {
            Some([price, amount, ..]) => Ok([to_f64(price, field)?, to_f64(amount, field)?]),
            _ => Err(malformed(field, level)),
        })
        .collect()
}

/// The symbol is the one requested, not whatever the backend echoes.
pub fn ticker(symbol: &str, raw: &Value) -> Result<Ticker> {
    Ok(Ticker {
        symbol: symbol.to_string(),
        last: number(raw, "last")?,
        bid: number(raw, "bid")?,
        ask: number(raw, "ask")?,
    })
}

/// First record whose symbol matches; flat when absent or zero-sized.
pub fn position(symbol: &str, records: &[Value]) -> Result<Position> {
    let Some(record) = records
        .iter()
        .find(|record| record.get("symbol").and_then(Value::as_str) == Some(symbol))
    else {
        return Ok(Position::flat(symbol));
    };

    let size = number_or_zero(record, "contracts")?;
    if size == 0.0 {
        return Ok(Position::flat(symbol));
    }

    let side = if record.get("side").and_then(Value::as_str) == Some("long") {
        PositionSide::Buy
    } else {
        PositionSide::Sell
    };

    Ok(Position {
        symbol: symbol.to_string(),
        side: Some(side),
        size: size.abs(),
        entry_price: number_or_zero(record, "entryPrice")?,
        unrealized_pnl: number_or_zero(record, "unrealizedPnl")?,
    })
}

/// `[t, o, h, l, c, v]` rows, order preserved.
pub fn candles(rows: &[Value]) -> Result<Vec<Ohlcv>> {
    rows.iter().map(candle).collect()
}

fn candle(row: &Value) -> Result<Ohlcv> {
    let Some([t, o, h, l, c, v, ..]) = row.as_array().map(Vec::as_slice) else {
        return Err(malformed("candle", row));
    };
    Ok(Ohlcv {
        timestamp: integer(t, "timestamp")?,
        open: to_f64(o, "open")?,
        high: to_f64(h, "high")?,
        low: to_f64(l, "low")?,
        close: to_f64(c, "close")?,
        volume: to_f64(v, "volume")?,
    })
}

/// One open order. A null, empty or zero price becomes `None`.
pub fn open_order(raw: &Value) -> Result<Order> {
    let side = raw
        .get("side")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("side", raw))?
        .parse::<OrderSide>()?;
    let symbol = raw
        .get("symbol")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("symbol", raw))?;

    let price = match raw.get("price") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(value @ Value::String(_)) => Some(to_f64(value, "price")?),
        Some(value) => Some(to_f64(value, "price")?).filter(|p| *p != 0.0),
    };

    Ok(Order {
        id: id_string(raw.get("id").unwrap_or(&Value::Null))?,
        symbol: symbol.to_string(),
        side,
        amount: number(raw, "amount")?,
        price,
    })
}

fn malformed(field: &str, value: &Value) -> ExchangeError {
    ExchangeError::MalformedResponse(format!("unexpected {field}: {value}"))
}
