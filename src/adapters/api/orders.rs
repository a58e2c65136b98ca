//! Order Actions — Builders and Result Parsing
//!
//! Builds the order/cancel actions the client signs and posts, and turns
//! `/exchange` status payloads and open-order rows into the unified
//! records the backend port returns.
//!
//! Market orders are emulated the way the venue's own SDK does it: an
//! IOC limit order priced through the mid by a slippage margin.

use serde_json::{Value, json};

use super::markets::{PerpMarket, price_to_wire, round_price, size_to_wire};
use super::types::{
    CancelAction, CancelWire, ExchangeResponse, LimitWire, OpenOrder, OrderAction, OrderTypeWire,
    OrderWire,
};
use crate::domain::OrderSide;
use crate::error::{ExchangeError, Result};

/// Default slippage applied to market orders (5%).
pub const DEFAULT_SLIPPAGE: f64 = 0.05;

/// Good-til-cancelled.
pub const TIF_GTC: &str = "Gtc";

/// Immediate-or-cancel.
pub const TIF_IOC: &str = "Ioc";

/// Build a single-order action.
pub fn order_action(
    market: &PerpMarket,
    side: OrderSide,
    amount: f64,
    price: f64,
    tif: &str,
) -> Result<OrderAction> {
    let wire = OrderWire {
        a: market.asset,
        b: side.is_buy(),
        p: price_to_wire(price, market.sz_decimals)?,
        s: size_to_wire(amount, market.sz_decimals)?,
        r: false,
        t: OrderTypeWire {
            limit: LimitWire {
                tif: tif.to_string(),
            },
        },
    };

    Ok(OrderAction {
        kind: "order".to_string(),
        orders: vec![wire],
        grouping: "na".to_string(),
    })
}

/// Build a single-cancel action.
pub fn cancel_action(market: &PerpMarket, oid: u64) -> CancelAction {
    CancelAction {
        kind: "cancel".to_string(),
        cancels: vec![CancelWire {
            a: market.asset,
            o: oid,
        }],
    }
}

/// Venue order ids are integers; anything else is rejected locally.
pub fn parse_order_id(order_id: &str) -> Result<u64> {
    order_id
        .trim()
        .parse::<u64>()
        .map_err(|_| ExchangeError::InvalidRequest(format!("invalid order id: {order_id:?}")))
}

/// Aggressive limit price for an emulated market order.
///
/// Buys pay up to `mid * (1 + slippage)`, sells accept down to
/// `mid * (1 - slippage)`, rounded to venue precision.
pub fn slippage_price(mid: f64, side: OrderSide, slippage: f64, sz_decimals: u32) -> Result<f64> {
    let raw = if side.is_buy() {
        mid * (1.0 + slippage)
    } else {
        mid * (1.0 - slippage)
    };
    round_price(raw, sz_decimals)
}

/// Unwrap an `/exchange` envelope into its per-request statuses.
pub fn statuses(response: ExchangeResponse) -> Result<Vec<Value>> {
    if response.status != "ok" {
        let message = response
            .response
            .as_str()
            .map_or_else(|| response.response.to_string(), str::to_string);
        return Err(classify_rejection(&message));
    }

    response
        .response
        .pointer("/data/statuses")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| {
            ExchangeError::MalformedResponse(format!(
                "missing statuses in exchange response: {}",
                response.response
            ))
        })
}

/// Unified record for a placed order.
///
/// The first status is either `{"resting": {"oid"}}`,
/// `{"filled": {"oid", "totalSz", "avgPx"}}` or `{"error": msg}`.
pub fn order_result(symbol: &str, statuses: &[Value]) -> Result<Value> {
    let status = statuses
        .first()
        .ok_or_else(|| ExchangeError::MalformedResponse("empty order statuses".to_string()))?;

    if let Some(message) = status.get("error").and_then(Value::as_str) {
        return Err(classify_rejection(message));
    }

    let (state, oid) = if let Some(resting) = status.get("resting") {
        ("open", resting.get("oid"))
    } else if let Some(filled) = status.get("filled") {
        ("closed", filled.get("oid"))
    } else {
        return Err(ExchangeError::MalformedResponse(format!(
            "unrecognized order status: {status}"
        )));
    };

    let oid = oid
        .cloned()
        .ok_or_else(|| ExchangeError::MalformedResponse(format!("order status without oid: {status}")))?;

    Ok(json!({
        "id": oid,
        "symbol": symbol,
        "status": state,
        "info": status,
    }))
}

/// Unified record for a cancel. The first status is `"success"` or `{"error": msg}`.
pub fn cancel_result(order_id: &str, symbol: &str, statuses: &[Value]) -> Result<Value> {
    match statuses.first() {
        Some(Value::String(s)) if s == "success" => Ok(json!({
            "id": order_id,
            "symbol": symbol,
            "status": "canceled",
        })),
        Some(status) => {
            let message = status
                .get("error")
                .and_then(Value::as_str)
                .map_or_else(|| status.to_string(), str::to_string);
            Err(classify_rejection(&message))
        }
        None => Err(ExchangeError::MalformedResponse("empty cancel statuses".to_string())),
    }
}

/// Unified record for one resting order.
pub fn unify_open_order(order: &OpenOrder, symbol: &str) -> Value {
    let side = if order.side == "B" { "buy" } else { "sell" };
    json!({
        "id": order.oid,
        "symbol": symbol,
        "side": side,
        "amount": order.sz,
        "price": order.limit_px,
        "timestamp": order.timestamp,
        "status": "open",
    })
}

/// Map a venue rejection message onto the error taxonomy.
pub fn classify_rejection(message: &str) -> ExchangeError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("does not exist") && lower.contains("wallet") {
        ExchangeError::Authentication(message.to_string())
    } else {
        ExchangeError::InvalidRequest(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc() -> PerpMarket {
        PerpMarket {
            symbol: "BTC/USDC:USDC".to_string(),
            coin: "BTC".to_string(),
            asset: 0,
            sz_decimals: 5,
        }
    }

    fn ok(statuses: Value) -> ExchangeResponse {
        ExchangeResponse {
            status: "ok".to_string(),
            response: json!({"type": "order", "data": {"statuses": statuses}}),
        }
    }

    #[test]
    fn test_order_action_rounds_to_market_precision() {
        let action = order_action(&btc(), OrderSide::Sell, 0.0123456, 30123.45, TIF_GTC).unwrap();
        let wire = &action.orders[0];
        assert_eq!(wire.a, 0);
        assert!(!wire.b);
        assert_eq!(wire.p, "30123");
        assert_eq!(wire.s, "0.01235");
        assert_eq!(wire.t.limit.tif, "Gtc");
        assert_eq!(action.grouping, "na");
    }

    #[test]
    fn test_slippage_price_direction() {
        let buy = slippage_price(30000.0, OrderSide::Buy, DEFAULT_SLIPPAGE, 5).unwrap();
        let sell = slippage_price(30000.0, OrderSide::Sell, DEFAULT_SLIPPAGE, 5).unwrap();
        assert!((buy - 31500.0).abs() < 1e-9);
        assert!((sell - 28500.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_order_id() {
        assert_eq!(parse_order_id("77738308").unwrap(), 77_738_308);
        assert!(matches!(
            parse_order_id("abc"),
            Err(ExchangeError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_resting_order_result() {
        let statuses = statuses(ok(json!([{"resting": {"oid": 77738308}}]))).unwrap();
        let result = order_result("BTC/USDC:USDC", &statuses).unwrap();
        assert_eq!(result["id"], 77738308);
        assert_eq!(result["status"], "open");
    }

    #[test]
    fn test_filled_order_result() {
        let statuses = statuses(ok(json!([
            {"filled": {"totalSz": "0.02", "avgPx": "1891.4", "oid": 77747314}}
        ])))
        .unwrap();
        let result = order_result("ETH/USDC:USDC", &statuses).unwrap();
        assert_eq!(result["id"], 77747314);
        assert_eq!(result["status"], "closed");
    }

    #[test]
    fn test_order_rejection_is_invalid_request() {
        let statuses = statuses(ok(json!([{"error": "Order must have minimum value of $10."}]))).unwrap();
        let err = order_result("BTC/USDC:USDC", &statuses).unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidRequest(m) if m.contains("$10")));
    }

    #[test]
    fn test_err_envelope() {
        let response = ExchangeResponse {
            status: "err".to_string(),
            response: json!("User or API Wallet 0xabc does not exist."),
        };
        assert!(matches!(
            statuses(response),
            Err(ExchangeError::Authentication(_))
        ));
    }

    #[test]
    fn test_cancel_results() {
        assert!(cancel_result("1", "BTC/USDC:USDC", &[json!("success")]).is_ok());
        let err = cancel_result(
            "1",
            "BTC/USDC:USDC",
            &[json!({"error": "Order was never placed, already canceled, or filled."})],
        )
        .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidRequest(_)));
    }

    #[test]
    fn test_unify_open_order_maps_side_codes() {
        let order = OpenOrder {
            coin: "BTC".to_string(),
            side: "A".to_string(),
            limit_px: "31000.0".to_string(),
            sz: "0.5".to_string(),
            oid: 91,
            timestamp: 1_700_000_000_000,
            orig_sz: None,
        };
        let unified = unify_open_order(&order, "BTC/USDC:USDC");
        assert_eq!(unified["side"], "sell");
        assert_eq!(unified["id"], 91);
        assert_eq!(unified["price"], "31000.0");
    }
}
