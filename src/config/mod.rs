//! Configuration Module - Exchange Connection Settings
//!
//! Holds the credentials and backend options handed to `Exchange::create`.
//! Keys follow the venue's camelCase naming (`walletAddress`, `privateKey`).
//! Anything the adapter does not interpret lives in the open `options`
//! map and is passed through to the backend untouched.

pub mod loader;

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ExchangeError, Result};

/// Env var overriding `walletAddress`.
pub const ENV_WALLET_ADDRESS: &str = "HYPERLIQUID_WALLET_ADDRESS";
/// Env var overriding `privateKey`.
pub const ENV_PRIVATE_KEY: &str = "HYPERLIQUID_PRIVATE_KEY";
/// Env var overriding `testnet` ("1"/"true" enables it).
pub const ENV_TESTNET: &str = "HYPERLIQUID_TESTNET";

/// Connection configuration for an exchange instance.
///
/// Credentials are optional so that market-data-only clients can be
/// built; private calls fail with `ExchangeError::Authentication` when
/// they are missing.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeConfig {
  /// Account address (0x + 40 hex).
  #[serde(default)]
  pub wallet_address: Option<String>,
  /// Signing key (0x + 64 hex). Never logged.
  #[serde(default)]
  pub private_key: Option<String>,
  /// Use the venue's testnet endpoints.
  #[serde(default)]
  pub testnet: bool,
  /// Per-request timeout in milliseconds.
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Client-side request budget.
  #[serde(default = "default_rate_limit")]
  pub rate_limit_per_second: u32,
  /// Maximum in-flight HTTP requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
  /// Backend-specific pass-through keys.
  #[serde(default)]
  pub options: HashMap<String, Value>,
}

impl ExchangeConfig {
  /// Config with account credentials and defaults for everything else.
  pub fn new(wallet_address: impl Into<String>, private_key: impl Into<String>) -> Self {
    Self {
      wallet_address: Some(wallet_address.into()),
      private_key: Some(private_key.into()),
      ..Self::default()
    }
  }

  /// Toggle testnet endpoints.
  #[must_use]
  pub const fn with_testnet(mut self, testnet: bool) -> Self {
    self.testnet = testnet;
    self
  }

  /// Set a pass-through backend option.
  #[must_use]
  pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.options.insert(key.into(), value.into());
    self
  }

  /// Build a config purely from `HYPERLIQUID_*` environment variables.
  pub fn from_env() -> Result<Self> {
    let mut config = Self::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
  }

  /// Overlay `HYPERLIQUID_*` environment variables onto this config.
  pub fn apply_env_overrides(&mut self) {
    self.apply_overrides(|key| std::env::var(key).ok());
  }

  /// Overlay values from an arbitrary key lookup (env vars in production).
  pub fn apply_overrides<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(address) = lookup(ENV_WALLET_ADDRESS) {
      self.wallet_address = Some(address);
    }
    if let Some(key) = lookup(ENV_PRIVATE_KEY) {
      self.private_key = Some(key);
    }
    if let Some(flag) = lookup(ENV_TESTNET) {
      self.testnet = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
  }

  /// Check credential shape and numeric limits.
  pub fn validate(&self) -> Result<()> {
    if let Some(address) = &self.wallet_address {
      if !is_hex_of_len(address, 40) {
        return Err(ExchangeError::Config(
          "walletAddress must be 0x followed by 40 hex characters".to_string(),
        ));
      }
    }
    if let Some(key) = &self.private_key {
      if !is_hex_of_len(key, 64) {
        // Never echo the key back in the message.
        return Err(ExchangeError::Config(
          "privateKey must be 0x followed by 64 hex characters".to_string(),
        ));
      }
    }
    if self.timeout_ms == 0 {
      return Err(ExchangeError::Config("timeoutMs must be positive".to_string()));
    }
    if self.rate_limit_per_second == 0 {
      return Err(ExchangeError::Config(
        "rateLimitPerSecond must be positive".to_string(),
      ));
    }
    if self.max_concurrent == 0 {
      return Err(ExchangeError::Config("maxConcurrent must be positive".to_string()));
    }
    Ok(())
  }

  /// Numeric pass-through option, if present and numeric.
  pub fn option_f64(&self, key: &str) -> Option<f64> {
    self.options.get(key).and_then(Value::as_f64)
  }

  /// String pass-through option, if present and a string.
  pub fn option_str(&self, key: &str) -> Option<&str> {
    self.options.get(key).and_then(Value::as_str)
  }
}

impl Default for ExchangeConfig {
  fn default() -> Self {
    Self {
      wallet_address: None,
      private_key: None,
      testnet: false,
      timeout_ms: default_timeout_ms(),
      rate_limit_per_second: default_rate_limit(),
      max_concurrent: default_max_concurrent(),
      options: HashMap::new(),
    }
  }
}

impl fmt::Debug for ExchangeConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ExchangeConfig")
      .field("wallet_address", &self.wallet_address)
      .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
      .field("testnet", &self.testnet)
      .field("timeout_ms", &self.timeout_ms)
      .field("rate_limit_per_second", &self.rate_limit_per_second)
      .field("max_concurrent", &self.max_concurrent)
      .field("options", &self.options)
      .finish()
  }
}

fn is_hex_of_len(value: &str, len: usize) -> bool {
  value
    .strip_prefix("0x")
    .is_some_and(|hex| hex.len() == len && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

// Default value functions for serde

const fn default_timeout_ms() -> u64 {
  10_000
}

const fn default_rate_limit() -> u32 {
  20
}

const fn default_max_concurrent() -> usize {
  8
}
