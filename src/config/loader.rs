//! Configuration Loader - File Loading and Validation
//!
//! Reads `config.toml`, overlays `HYPERLIQUID_*` environment variables
//! (secrets belong in the environment, not the file), then validates.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::ExchangeConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<ExchangeConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config = parse_config(&content)?;
  config.apply_env_overrides();
  config.validate().context("Invalid exchange configuration")?;

  info!(
    testnet = config.testnet,
    has_wallet = config.wallet_address.is_some(),
    has_signer = config.private_key.is_some(),
    options = config.options.len(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse config text without touching the environment.
pub fn parse_config(content: &str) -> Result<ExchangeConfig> {
  toml::from_str(content).context("Failed to parse config.toml")
}
