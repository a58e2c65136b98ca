//! Error Taxonomy - Backend Failures Surfaced to Callers
//!
//! A single error enum shared by the connectivity backend and the venue
//! adapter. The backend classifies failures; the adapter passes them
//! through untouched with `?`.

use thiserror::Error;

/// Errors raised by exchange operations.
#[derive(Debug, Error)]
pub enum ExchangeError {
  /// Network unreachable, connection reset, or request timeout.
  #[error("network error: {0}")]
  Network(String),

  /// Missing credentials, bad private key, or signing failure.
  #[error("authentication failed: {0}")]
  Authentication(String),

  /// The venue rejected the request (bad amount, insufficient margin, ...).
  #[error("invalid request: {0}")]
  InvalidRequest(String),

  /// Symbol is not a loaded market.
  #[error("unknown symbol: {symbol}")]
  BadSymbol {
    /// The symbol that was requested.
    symbol: String,
  },

  /// HTTP 429 from the venue.
  #[error("rate limited: {0}")]
  RateLimited(String),

  /// 5xx from the venue.
  #[error("exchange unavailable: {0}")]
  ExchangeUnavailable(String),

  /// Response body could not be decoded or lacks a required field.
  #[error("malformed response: {0}")]
  MalformedResponse(String),

  /// Best-price accessor on an empty side of the book.
  #[error("order book has no {side}")]
  EmptyBook {
    /// "asks" or "bids".
    side: &'static str,
  },

  /// Invalid configuration.
  #[error("configuration error: {0}")]
  Config(String),

  /// The instance was closed.
  #[error("exchange closed by user")]
  Closed,
}

impl From<reqwest::Error> for ExchangeError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      Self::MalformedResponse(err.to_string())
    } else {
      Self::Network(err.to_string())
    }
  }
}

impl From<serde_json::Error> for ExchangeError {
  fn from(err: serde_json::Error) -> Self {
    Self::MalformedResponse(err.to_string())
  }
}

/// Result alias used across ports and adapters.
pub type Result<T> = std::result::Result<T, ExchangeError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_book_message_names_side() {
    let err = ExchangeError::EmptyBook { side: "asks" };
    assert_eq!(err.to_string(), "order book has no asks");
  }

  #[test]
  fn test_json_error_maps_to_malformed() {
    let err: ExchangeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, ExchangeError::MalformedResponse(_)));
  }
}
