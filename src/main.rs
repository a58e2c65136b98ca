//! Exchange Core — Market Snapshot Runner
//!
//! Connects to Hyperliquid, fetches the order book and ticker for one
//! symbol concurrently, logs them, and disconnects.
//!
//! Usage: `exchange-core [CONFIG_PATH] [SYMBOL]`
//!
//! Wiring sequence:
//! 1. Init tracing (JSON structured logging, `RUST_LOG` filter)
//! 2. Load config.toml + `HYPERLIQUID_*` overrides + validate
//! 3. Create the exchange (build client, load markets)
//! 4. Join order book and ticker requests
//! 5. Close the exchange

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use exchange_core::config::loader::load_config;
use exchange_core::{Exchange, HyperliquidExchange};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_SYMBOL: &str = "BTC/USDC:USDC";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let symbol = args.next().unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path,
        symbol = %symbol,
        "Starting exchange-core"
    );

    // ── 2. Load configuration ───────────────────────────────
    let config = load_config(&config_path).context("Failed to load configuration")?;

    // ── 3. Connect and load markets ─────────────────────────
    let exchange: HyperliquidExchange = HyperliquidExchange::create(config)
        .await
        .context("Failed to create exchange")?;

    // ── 4. Fetch order book and ticker concurrently ─────────
    let snapshot = tokio::try_join!(exchange.get_orderbook(&symbol), exchange.get_ticker(&symbol));

    match &snapshot {
        Ok((book, ticker)) => {
            info!(
                symbol = %symbol,
                best_bid = ?book.best_bid().ok(),
                best_ask = ?book.best_ask().ok(),
                depth_bids = book.bids.len(),
                depth_asks = book.asks.len(),
                last = ticker.last,
                bid = ticker.bid,
                ask = ticker.ask,
                "Market snapshot"
            );
        }
        Err(e) => warn!(symbol = %symbol, error = %e, "Snapshot failed"),
    }

    // ── 5. Close even when the snapshot failed ──────────────
    exchange.close().await.context("Failed to close exchange")?;
    info!("Shutdown complete");

    snapshot.map(|_| ()).context("Market snapshot failed")
}
