//! Hyperliquid REST API Adapter
//!
//! Implements the HTTP backend for Hyperliquid perpetuals: market
//! metadata, `/info` reads, and signed `/exchange` actions.
//!
//! Sub-modules:
//! - `auth`: L1 action hashing, EIP-712 phantom-agent signing, nonces
//! - `client`: HTTP client with rate limiting; implements `ExchangeBackend`
//! - `info`: `/info` payloads to unified records
//! - `markets`: Symbol resolution and wire precision
//! - `orders`: Order/cancel actions and their results
//! - `types`: API request/response type definitions

pub mod auth;
pub mod client;
pub mod info;
pub mod markets;
pub mod orders;
pub mod types;

pub use client::HyperliquidClient;
