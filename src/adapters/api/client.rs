//! Hyperliquid HTTP Client - Rate-limited REST Backend
//!
//! Wraps reqwest with client-side rate limiting, an in-flight cap,
//! L1 action signing and per-request metrics. Implements the
//! `ExchangeBackend` port for Hyperliquid perpetuals.
//!
//! Every call is a single POST: market and account reads go to `/info`,
//! signed actions to `/exchange`. Failures are classified once here and
//! never retried.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use alloy::primitives::Address;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::auth::{L1Signer, NonceGenerator};
use super::info::{timeframe_ms, unify_candle, unify_order_book, unify_position, unify_ticker};
use super::markets::{MarketCache, PerpMarket};
use super::orders::{
  DEFAULT_SLIPPAGE, TIF_GTC, TIF_IOC, cancel_action, cancel_result, order_action, order_result,
  parse_order_id, slippage_price, statuses, unify_open_order,
};
use super::types::{
  AssetCtx, Candle, ClearinghouseState, ExchangeRequest, ExchangeResponse, L2Book, Meta, OpenOrder,
};
use crate::adapters::metrics::ExchangeMetrics;
use crate::config::ExchangeConfig;
use crate::domain::{OrderSide, OrderType};
use crate::error::{ExchangeError, Result};
use crate::ports::ExchangeBackend;

/// Mainnet REST root.
pub const MAINNET_API_URL: &str = "https://api.hyperliquid.xyz";

/// Testnet REST root.
pub const TESTNET_API_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Option keys this client interprets; others are ignored.
const KNOWN_OPTIONS: &[&str] = &["defaultSlippage", "baseUrl", "vaultAddress"];

/// Rate-limited HTTP client for the Hyperliquid API.
pub struct HyperliquidClient {
  /// Underlying HTTP client.
  http: Client,
  /// REST root without trailing slash.
  base_url: String,
  /// Action signer; absent for read-only clients.
  signer: Option<L1Signer>,
  /// Account queried by `/info` user requests.
  wallet_address: Option<String>,
  /// Vault traded on behalf of, if any.
  vault: Option<Address>,
  /// Market-order slippage fraction.
  slippage: f64,
  /// Perpetual markets keyed by symbol.
  markets: MarketCache,
  /// Client-side request budget.
  limiter: DefaultDirectRateLimiter,
  /// In-flight request cap.
  semaphore: Semaphore,
  /// Action nonces.
  nonces: NonceGenerator,
  /// Request counters and latencies.
  metrics: ExchangeMetrics,
  /// Set once by `close`.
  closed: AtomicBool,
}

impl HyperliquidClient {
  /// Request metrics recorded by this client.
  pub const fn metrics(&self) -> &ExchangeMetrics {
    &self.metrics
  }

  /// REST root in use.
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Whether `close` has been called.
  pub fn is_closed(&self) -> bool {
    self.closed.load(Ordering::Acquire)
  }

  fn ensure_open(&self) -> Result<()> {
    if self.is_closed() {
      return Err(ExchangeError::Closed);
    }
    Ok(())
  }

  fn signer(&self) -> Result<&L1Signer> {
    self
      .signer
      .as_ref()
      .ok_or_else(|| ExchangeError::Authentication("privateKey is required to trade".to_string()))
  }

  /// Account for user queries: the configured wallet, else the signer's address.
  fn user(&self) -> Result<String> {
    if let Some(address) = &self.wallet_address {
      return Ok(address.to_lowercase());
    }
    self
      .signer
      .as_ref()
      .map(|signer| format!("{:#x}", signer.address()))
      .ok_or_else(|| {
        ExchangeError::Authentication("walletAddress or privateKey is required".to_string())
      })
  }

  /// Resolve a symbol, loading markets on first use.
  async fn market(&self, symbol: &str) -> Result<PerpMarket> {
    if self.markets.is_empty().await {
      self.load_markets().await?;
    }
    self.markets.get(symbol).await
  }

  /// POST an `/info` request.
  async fn info<T: DeserializeOwned>(&self, body: Value) -> Result<T> {
    self.post("info", &body).await
  }

  /// Sign and POST an `/exchange` action, returning its statuses.
  async fn exchange<A: Serialize + Sync>(&self, action: &A) -> Result<Vec<Value>> {
    let signer = self.signer()?;
    let nonce = self.nonces.next();
    let signature = signer.sign_l1_action(action, nonce, self.vault)?;
    let request = ExchangeRequest {
      action,
      nonce,
      signature,
      vault_address: self.vault.map(|address| format!("{address:#x}")),
    };

    let response: ExchangeResponse = self.post("exchange", &request).await?;
    statuses(response)
  }

  /// Throttle, send and decode one request, recording metrics.
  async fn post<B, T>(&self, endpoint: &'static str, body: &B) -> Result<T>
  where
    B: Serialize + Sync + ?Sized,
    T: DeserializeOwned,
  {
    self.ensure_open()?;
    self.limiter.until_ready().await;
    let _permit = self
      .semaphore
      .acquire()
      .await
      .map_err(|_| ExchangeError::Closed)?;

    let started = Instant::now();
    let result = self.send(endpoint, body).await;
    self
      .metrics
      .observe(endpoint, started.elapsed(), result.as_ref().err());

    if let Err(e) = &result {
      warn!(endpoint, error = %e, "Request failed");
    }
    result
  }

  async fn send<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
  where
    B: Serialize + Sync + ?Sized,
    T: DeserializeOwned,
  {
    let url = format!("{}/{endpoint}", self.base_url);
    let response = self.http.post(&url).json(body).send().await?;
    let status = response.status();

    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      return Err(classify_status(status, text));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

/// Map a non-success HTTP status onto the error taxonomy.
fn classify_status(status: StatusCode, body: String) -> ExchangeError {
  let detail = format!("{status}: {body}");
  if status == StatusCode::TOO_MANY_REQUESTS {
    ExchangeError::RateLimited(detail)
  } else if status.is_server_error() {
    ExchangeError::ExchangeUnavailable(detail)
  } else {
    ExchangeError::InvalidRequest(detail)
  }
}

#[async_trait]
impl ExchangeBackend for HyperliquidClient {
  fn from_config(config: &ExchangeConfig) -> Result<Self> {
    config.validate()?;

    let http = Client::builder()
      .timeout(Duration::from_millis(config.timeout_ms))
      .pool_max_idle_per_host(5)
      .build()
      .map_err(|e| ExchangeError::Config(format!("failed to build HTTP client: {e}")))?;

    let base_url = config
      .option_str("baseUrl")
      .unwrap_or(if config.testnet { TESTNET_API_URL } else { MAINNET_API_URL })
      .trim_end_matches('/')
      .to_string();

    let signer = config
      .private_key
      .as_deref()
      .map(|key| L1Signer::from_private_key(key, !config.testnet))
      .transpose()?;

    let vault = config
      .option_str("vaultAddress")
      .map(|raw| {
        raw
          .parse::<Address>()
          .map_err(|_| ExchangeError::Config(format!("vaultAddress is not an address: {raw}")))
      })
      .transpose()?;

    let slippage = config.option_f64("defaultSlippage").unwrap_or(DEFAULT_SLIPPAGE);
    if !(0.0..1.0).contains(&slippage) {
      return Err(ExchangeError::Config(format!(
        "defaultSlippage must be in [0, 1), got {slippage}"
      )));
    }

    for key in config.options.keys() {
      if !KNOWN_OPTIONS.contains(&key.as_str()) {
        debug!(option = %key, "Ignoring unrecognized option");
      }
    }

    let per_second = NonZeroU32::new(config.rate_limit_per_second)
      .ok_or_else(|| ExchangeError::Config("rateLimitPerSecond must be positive".to_string()))?;
    let metrics = ExchangeMetrics::new()
      .map_err(|e| ExchangeError::Config(format!("failed to register metrics: {e}")))?;

    info!(
      base_url = %base_url,
      testnet = config.testnet,
      can_trade = signer.is_some(),
      vault = vault.is_some(),
      "Hyperliquid client configured"
    );

    Ok(Self {
      http,
      base_url,
      signer,
      wallet_address: config.wallet_address.clone(),
      vault,
      slippage,
      markets: MarketCache::new(),
      limiter: RateLimiter::direct(Quota::per_second(per_second)),
      semaphore: Semaphore::new(config.max_concurrent),
      nonces: NonceGenerator::new(),
      metrics,
      closed: AtomicBool::new(false),
    })
  }

  #[instrument(skip(self))]
  async fn load_markets(&self) -> Result<()> {
    let meta: Meta = self.info(json!({"type": "meta"})).await?;
    let count = self.markets.replace(&meta).await;
    info!(markets = count, "Markets loaded");
    Ok(())
  }

  #[instrument(skip(self))]
  async fn fetch_order_book(&self, symbol: &str) -> Result<Value> {
    let market = self.market(symbol).await?;
    let book: L2Book = self
      .info(json!({"type": "l2Book", "coin": market.coin}))
      .await?;
    unify_order_book(symbol, &book)
  }

  #[instrument(skip(self))]
  async fn fetch_ticker(&self, symbol: &str) -> Result<Value> {
    let market = self.market(symbol).await?;
    let (_meta, contexts): (Meta, Vec<AssetCtx>) =
      self.info(json!({"type": "metaAndAssetCtxs"})).await?;
    let index = usize::try_from(market.asset)
      .map_err(|_| ExchangeError::MalformedResponse(format!("asset index {}", market.asset)))?;
    let ctx = contexts.get(index).ok_or_else(|| {
      ExchangeError::MalformedResponse(format!("no asset context for {symbol}"))
    })?;
    unify_ticker(symbol, ctx)
  }

  #[instrument(skip(self))]
  async fn fetch_positions(&self, symbols: &[String]) -> Result<Vec<Value>> {
    let user = self.user()?;
    if self.markets.is_empty().await {
      self.load_markets().await?;
    }
    let state: ClearinghouseState = self
      .info(json!({"type": "clearinghouseState", "user": user}))
      .await?;

    let mut positions = Vec::with_capacity(state.asset_positions.len());
    for entry in &state.asset_positions {
      let Some(market) = self.markets.by_coin(&entry.position.coin).await else {
        continue;
      };
      if !symbols.is_empty() && !symbols.contains(&market.symbol) {
        continue;
      }
      positions.push(unify_position(&market.symbol, &entry.position)?);
    }
    Ok(positions)
  }

  #[instrument(skip(self))]
  async fn create_order(
    &self,
    symbol: &str,
    order_type: OrderType,
    side: OrderSide,
    amount: f64,
    price: Option<f64>,
  ) -> Result<Value> {
    self.signer()?;
    let market = self.market(symbol).await?;

    let (price, tif) = match order_type {
      OrderType::Limit => {
        let price = price.ok_or_else(|| {
          ExchangeError::InvalidRequest("limit orders require a price".to_string())
        })?;
        (price, TIF_GTC)
      }
      OrderType::Market => {
        let mids: std::collections::HashMap<String, String> =
          self.info(json!({"type": "allMids"})).await?;
        let mid = mids
          .get(&market.coin)
          .and_then(|raw| raw.parse::<f64>().ok())
          .ok_or_else(|| {
            ExchangeError::MalformedResponse(format!("no mid price for {}", market.coin))
          })?;
        let price = slippage_price(mid, side, self.slippage, market.sz_decimals)?;
        (price, TIF_IOC)
      }
    };

    let action = order_action(&market, side, amount, price, tif)?;
    let statuses = self.exchange(&action).await?;
    let result = order_result(symbol, &statuses)?;
    info!(
      symbol,
      side = %side,
      kind = order_type.as_str(),
      amount,
      price,
      id = %result["id"],
      "Order accepted"
    );
    Ok(result)
  }

  #[instrument(skip(self))]
  async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<Value> {
    self.signer()?;
    let oid = parse_order_id(order_id)?;
    let market = self.market(symbol).await?;
    let statuses = self.exchange(&cancel_action(&market, oid)).await?;
    let result = cancel_result(order_id, symbol, &statuses)?;
    info!(symbol, order_id, "Order canceled");
    Ok(result)
  }

  #[instrument(skip(self))]
  async fn fetch_ohlcv(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<Vec<Value>> {
    let interval_ms = timeframe_ms(timeframe)?;
    let market = self.market(symbol).await?;
    if limit == 0 {
      return Ok(Vec::new());
    }

    let end = chrono::Utc::now().timestamp_millis();
    let span = i64::try_from(limit)
      .unwrap_or(i64::MAX)
      .saturating_mul(interval_ms);
    let start = end.saturating_sub(span);

    let mut candles: Vec<Candle> = self
      .info(json!({
        "type": "candleSnapshot",
        "req": {
          "coin": market.coin,
          "interval": timeframe,
          "startTime": start,
          "endTime": end,
        },
      }))
      .await?;

    candles.sort_by_key(|candle| candle.open_time);
    let skip = candles.len().saturating_sub(limit);
    candles[skip..].iter().map(unify_candle).collect()
  }

  #[instrument(skip(self))]
  async fn fetch_open_orders(&self, symbol: &str) -> Result<Vec<Value>> {
    let user = self.user()?;
    let market = self.market(symbol).await?;
    let orders: Vec<OpenOrder> = self
      .info(json!({"type": "frontendOpenOrders", "user": user}))
      .await?;

    Ok(
      orders
        .iter()
        .filter(|order| order.coin == market.coin)
        .map(|order| unify_open_order(order, symbol))
        .collect(),
    )
  }

  #[instrument(skip(self))]
  async fn close(&self) -> Result<()> {
    if self.closed.swap(true, Ordering::AcqRel) {
      debug!("Client already closed");
      return Ok(());
    }
    self.semaphore.close();
    info!("Hyperliquid client closed");
    Ok(())
  }
}
