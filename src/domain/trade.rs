//! Trading domain types.
//!
//! Orders and positions as returned by the exchange interface. Sides are
//! enums at this boundary; their wire spellings ("buy"/"sell" for orders,
//! "Buy"/"Sell" for positions) are kept through serde.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;

/// Lightweight order identifier used at the ports boundary.
pub type OrderId = String;

/// Unified market symbol, e.g. "BTC/USDC:USDC".
pub type Symbol = String;

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
  Buy,
  Sell,
}

impl OrderSide {
  /// Wire spelling.
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Buy => "buy",
      Self::Sell => "sell",
    }
  }

  pub const fn is_buy(self) -> bool {
    matches!(self, Self::Buy)
  }
}

impl fmt::Display for OrderSide {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderSide {
  type Err = ExchangeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "buy" => Ok(Self::Buy),
      "sell" => Ok(Self::Sell),
      other => Err(ExchangeError::MalformedResponse(format!(
        "unknown order side: {other:?}"
      ))),
    }
  }
}

/// Order execution style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
  /// Rests on the book at the given price.
  Limit,
  /// Executes immediately against available liquidity.
  Market,
}

impl OrderType {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Limit => "limit",
      Self::Market => "market",
    }
  }
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
  Buy,
  Sell,
}

impl fmt::Display for PositionSide {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Buy => f.write_str("Buy"),
      Self::Sell => f.write_str("Sell"),
    }
  }
}

/// An order as acknowledged by the exchange.
///
/// Only `id` is venue-confirmed on placement; the remaining fields echo
/// what was submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  /// Venue-assigned order ID, always in string form.
  pub id: OrderId,
  /// Market symbol.
  pub symbol: Symbol,
  /// Buy or sell.
  pub side: OrderSide,
  /// Order size in base units.
  pub amount: f64,
  /// Limit price; `None` for market orders.
  pub price: Option<f64>,
}

/// Current position in one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
  /// Market symbol.
  pub symbol: Symbol,
  /// `None` exactly when the position is flat.
  pub side: Option<PositionSide>,
  /// Absolute size in contracts.
  pub size: f64,
  /// Average entry price.
  pub entry_price: f64,
  /// Unrealized profit and loss in quote currency.
  pub unrealized_pnl: f64,
}

impl Position {
  /// The no-position sentinel: no side, all numbers zero.
  pub fn flat(symbol: impl Into<Symbol>) -> Self {
    Self {
      symbol: symbol.into(),
      side: None,
      size: 0.0,
      entry_price: 0.0,
      unrealized_pnl: 0.0,
    }
  }

  pub fn is_flat(&self) -> bool {
    self.side.is_none()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_order_side_wire_format() {
    assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), "\"buy\"");
    assert_eq!("SELL".parse::<OrderSide>().unwrap(), OrderSide::Sell);
    assert!("long".parse::<OrderSide>().is_err());
  }

  #[test]
  fn test_position_side_wire_format() {
    assert_eq!(serde_json::to_string(&PositionSide::Sell).unwrap(), "\"Sell\"");
  }

  #[test]
  fn test_flat_position_sentinel() {
    let pos = Position::flat("ETH/USDC:USDC");
    assert!(pos.is_flat());
    assert_eq!(pos.size, 0.0);
    assert_eq!(pos.entry_price, 0.0);
    assert_eq!(pos.unrealized_pnl, 0.0);
  }
}
