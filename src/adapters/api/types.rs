//! Hyperliquid API Request/Response Types
//!
//! Serialization types for the `/info` and `/exchange` endpoints.
//! Action structs double as the msgpack input for L1 signing, so their
//! field order matches the venue's reference encoding and must not be
//! rearranged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── /info responses ─────────────────────────────────────────

/// Perpetuals universe from `{"type": "meta"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    /// Assets in index order; the position is the asset id.
    pub universe: Vec<AssetMeta>,
}

/// One perpetual asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMeta {
    /// Coin name, e.g. "BTC".
    pub name: String,
    /// Size precision in decimals.
    pub sz_decimals: u32,
    /// Delisted assets stay in the universe to keep indices stable.
    #[serde(default)]
    pub is_delisted: Option<bool>,
}

/// Per-asset context from `{"type": "metaAndAssetCtxs"}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCtx {
    #[serde(default)]
    pub mid_px: Option<String>,
    #[serde(default)]
    pub mark_px: Option<String>,
    #[serde(default)]
    pub oracle_px: Option<String>,
    /// `[impact bid, impact ask]`.
    #[serde(default)]
    pub impact_pxs: Option<Vec<String>>,
    #[serde(default)]
    pub funding: Option<String>,
    #[serde(default)]
    pub open_interest: Option<String>,
}

/// L2 book from `{"type": "l2Book"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct L2Book {
    pub coin: String,
    /// Snapshot time (Unix ms).
    pub time: u64,
    /// `[bids, asks]`.
    pub levels: Vec<Vec<L2Level>>,
}

/// One aggregated price level.
#[derive(Debug, Clone, Deserialize)]
pub struct L2Level {
    pub px: String,
    pub sz: String,
    /// Number of orders at this level.
    pub n: u32,
}

/// Account state from `{"type": "clearinghouseState"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearinghouseState {
    pub asset_positions: Vec<AssetPosition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetPosition {
    pub position: PerpPosition,
}

/// A perpetual position; `szi` is signed (negative = short).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerpPosition {
    pub coin: String,
    pub szi: String,
    #[serde(default)]
    pub entry_px: Option<String>,
    #[serde(default)]
    pub unrealized_pnl: Option<String>,
    #[serde(default)]
    pub position_value: Option<String>,
    #[serde(default)]
    pub liquidation_px: Option<String>,
    #[serde(default)]
    pub leverage: Option<Leverage>,
}

/// Position leverage; the cross/isolated mode is not read.
#[derive(Debug, Clone, Deserialize)]
pub struct Leverage {
    pub value: u32,
}

/// Candle from `{"type": "candleSnapshot"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Candle {
    /// Open time (Unix ms).
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "o")]
    pub open: String,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
    #[serde(rename = "c")]
    pub close: String,
    #[serde(rename = "v")]
    pub volume: String,
}

/// Resting order from `{"type": "frontendOpenOrders"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    pub coin: String,
    /// "B" (bid/buy) or "A" (ask/sell).
    pub side: String,
    pub limit_px: String,
    /// Remaining size.
    pub sz: String,
    pub oid: u64,
    pub timestamp: u64,
    #[serde(default)]
    pub orig_sz: Option<String>,
}

// ── /exchange actions ───────────────────────────────────────

/// Time-in-force wrapper: `{"limit": {"tif": "Gtc"}}`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderTypeWire {
    pub limit: LimitWire,
}

#[derive(Debug, Clone, Serialize)]
pub struct LimitWire {
    /// "Gtc", "Ioc" or "Alo".
    pub tif: String,
}

/// Single order in an order action.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWire {
    /// Asset index.
    pub a: u32,
    /// Is buy.
    pub b: bool,
    /// Price as a normalized decimal string.
    pub p: String,
    /// Size as a normalized decimal string.
    pub s: String,
    /// Reduce only.
    pub r: bool,
    /// Order type.
    pub t: OrderTypeWire,
}

/// `{"type": "order", "orders": [...], "grouping": "na"}`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub orders: Vec<OrderWire>,
    pub grouping: String,
}

/// Single cancel by asset index and order id.
#[derive(Debug, Clone, Serialize)]
pub struct CancelWire {
    pub a: u32,
    pub o: u64,
}

/// `{"type": "cancel", "cancels": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct CancelAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub cancels: Vec<CancelWire>,
}

/// ECDSA signature in the venue's JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureWire {
    pub r: String,
    pub s: String,
    pub v: u8,
}

/// Signed `/exchange` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest<'a, A> {
    pub action: &'a A,
    pub nonce: u64,
    pub signature: SignatureWire,
    pub vault_address: Option<String>,
}

/// Envelope of every `/exchange` response.
///
/// On `"ok"` the payload is `{"type": ..., "data": {"statuses": [...]}}`;
/// on `"err"` it is the error message string.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeResponse {
    pub status: String,
    #[serde(default)]
    pub response: Value,
}
