//! HTTP Client Tests - HyperliquidClient against a Loopback Venue
//!
//! Binds a TcpListener on 127.0.0.1:0, serves canned `/info` and
//! `/exchange` payloads and points the client at it via the `baseUrl`
//! option. Each accepted connection answers one request and closes.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use exchange_core::adapters::api::HyperliquidClient;
use exchange_core::config::ExchangeConfig;
use exchange_core::domain::{OrderSide, OrderType};
use exchange_core::error::ExchangeError;
use exchange_core::ports::ExchangeBackend;

const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const WALLET: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";
const BTC: &str = "BTC/USDC:USDC";
const ETH: &str = "ETH/USDC:USDC";
const HOUR_MS: i64 = 3_600_000;
const T0: i64 = 1_700_000_000_000;

/// Status code and body.
type Reply = (u16, String);

/// Request path and JSON body in, canned reply out.
type Handler = Arc<dyn Fn(&str, &Value) -> Reply + Send + Sync>;

/// Requests seen by the server, in arrival order.
type Recorded = Arc<Mutex<Vec<(String, Value)>>>;

// ---- Loopback Server ----

async fn serve(handler: Handler) -> (String, Recorded) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded: Recorded = Arc::default();
    let log = Arc::clone(&recorded);

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            let log = Arc::clone(&log);
            tokio::spawn(respond(socket, handler, log));
        }
    });

    (format!("http://{addr}"), recorded)
}

async fn respond(mut socket: TcpStream, handler: Handler, log: Recorded) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    while buf.len() < header_end + length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let body: Value = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);
    let (status, reply) = handler(&path, &body);
    log.lock().unwrap().push((path, body));

    let response = format!(
        "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
        reason(status),
        reply.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn ok(body: &Value) -> Reply {
    (200, body.to_string())
}

// ---- Canned Venue ----

fn meta() -> Value {
    json!({"universe": [
        {"name": "BTC", "szDecimals": 5, "maxLeverage": 50},
        {"name": "ETH", "szDecimals": 4, "maxLeverage": 50}
    ]})
}

fn candle(hours: i64) -> Value {
    json!({
        "t": T0 + hours * HOUR_MS,
        "T": T0 + (hours + 1) * HOUR_MS - 1,
        "s": "BTC",
        "i": "1h",
        "o": format!("{}.0", 30_000 + hours),
        "h": "30100.0",
        "l": "29900.0",
        "c": "30050.5",
        "v": "12.25",
        "n": 40
    })
}

fn clearinghouse_state() -> Value {
    json!({
        "assetPositions": [
            {"type": "oneWay", "position": {
                "coin": "BTC", "szi": "-0.5", "entryPx": "30000.0", "unrealizedPnl": "12.5",
                "positionValue": "15000.0", "liquidationPx": null,
                "leverage": {"type": "cross", "value": 20}
            }},
            {"type": "oneWay", "position": {
                "coin": "ETH", "szi": "2.0", "entryPx": "2000.0", "unrealizedPnl": "-4.0",
                "leverage": {"type": "isolated", "value": 5}
            }},
            {"type": "oneWay", "position": {"coin": "GONE", "szi": "1.0"}}
        ],
        "withdrawable": "100.0"
    })
}

fn open_orders() -> Value {
    json!([
        {"coin": "BTC", "side": "B", "limitPx": "29000.0", "sz": "0.1", "oid": 11,
         "timestamp": 1_700_000_000_000_u64, "origSz": "0.1"},
        {"coin": "ETH", "side": "A", "limitPx": "2100.0", "sz": "1.0", "oid": 12,
         "timestamp": 1_700_000_000_001_u64}
    ])
}

/// Healthy venue; `/exchange` always answers with `exchange_reply`.
fn venue(exchange_reply: Value) -> Handler {
    Arc::new(move |path: &str, body: &Value| -> Reply {
        if path == "/exchange" {
            return ok(&exchange_reply);
        }
        match body["type"].as_str() {
            Some("meta") => ok(&meta()),
            Some("metaAndAssetCtxs") => ok(&json!([meta(), [
                {"midPx": "30000.5", "markPx": "30001.0", "impactPxs": ["29999.0", "30002.0"]},
                {"midPx": null, "markPx": "2000.0", "impactPxs": ["1999.5", "2000.5"]}
            ]])),
            Some("l2Book") => ok(&json!({"coin": "BTC", "time": 1_700_000_000_000_u64, "levels": [
                [{"px": "30000.0", "sz": "1.5", "n": 3}, {"px": "29999.0", "sz": "2", "n": 1}],
                [{"px": "30001.0", "sz": "0.5", "n": 1}]
            ]})),
            // Rows out of order and more than requested.
            Some("candleSnapshot") => ok(&json!([candle(3), candle(1), candle(5), candle(2), candle(4)])),
            Some("clearinghouseState") => ok(&clearinghouse_state()),
            Some("frontendOpenOrders") => ok(&open_orders()),
            Some("allMids") => ok(&json!({"BTC": "30000.0", "ETH": "2000.0"})),
            _ => (400, "\"unknown request\"".to_string()),
        }
    })
}

/// Every request gets the same reply.
fn fixed(status: u16, body: &'static str) -> Handler {
    Arc::new(move |_: &str, _: &Value| -> Reply { (status, body.to_string()) })
}

fn order_reply(status: Value) -> Value {
    json!({"status": "ok", "response": {"type": "order", "data": {"statuses": [status]}}})
}

fn client(base_url: &str) -> HyperliquidClient {
    let config = ExchangeConfig::new(WALLET, KEY).with_option("baseUrl", base_url);
    HyperliquidClient::from_config(&config).unwrap()
}

/// Recorded bodies of one `/info` type, or of `/exchange` when `kind` is "exchange".
fn requests_of(recorded: &Recorded, kind: &str) -> Vec<Value> {
    recorded
        .lock()
        .unwrap()
        .iter()
        .filter(|(path, body)| {
            if kind == "exchange" {
                path == "/exchange"
            } else {
                path == "/info" && body["type"] == kind
            }
        })
        .map(|(_, body)| body.clone())
        .collect()
}

// ---- Market Data ----

#[tokio::test]
async fn test_load_markets_posts_meta() {
    let (url, recorded) = serve(venue(Value::Null)).await;
    let client = client(&url);

    client.load_markets().await.unwrap();

    let metas = requests_of(&recorded, "meta");
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0], json!({"type": "meta"}));
}

#[tokio::test]
async fn test_order_book_over_http() {
    let (url, recorded) = serve(venue(Value::Null)).await;
    let book = client(&url).fetch_order_book(BTC).await.unwrap();

    assert_eq!(book["symbol"], BTC);
    assert_eq!(book["bids"], json!([[30000.0, 1.5], [29999.0, 2.0]]));
    assert_eq!(book["asks"], json!([[30001.0, 0.5]]));
    assert_eq!(requests_of(&recorded, "l2Book")[0]["coin"], "BTC");
}

#[tokio::test]
async fn test_ticker_uses_context_at_asset_index() {
    let (url, _recorded) = serve(venue(Value::Null)).await;
    let ticker = client(&url).fetch_ticker(ETH).await.unwrap();

    // midPx is null for ETH, so last falls back to markPx.
    assert_eq!(ticker["last"], 2000.0);
    assert_eq!(ticker["bid"], 1999.5);
    assert_eq!(ticker["ask"], 2000.5);
}

#[tokio::test]
async fn test_ohlcv_keeps_last_limit_candles_sorted() {
    let (url, recorded) = serve(venue(Value::Null)).await;
    let rows = client(&url).fetch_ohlcv(BTC, "1h", 3).await.unwrap();

    let times: Vec<i64> = rows.iter().map(|row| row[0].as_i64().unwrap()).collect();
    assert_eq!(times, vec![T0 + 3 * HOUR_MS, T0 + 4 * HOUR_MS, T0 + 5 * HOUR_MS]);
    assert_eq!(rows[0][1], 30003.0);
    assert_eq!(rows[2][4], 30050.5);
    assert_eq!(rows[2][5], 12.25);

    let request = &requests_of(&recorded, "candleSnapshot")[0]["req"];
    assert_eq!(request["coin"], "BTC");
    assert_eq!(request["interval"], "1h");
    let span = request["endTime"].as_i64().unwrap() - request["startTime"].as_i64().unwrap();
    assert_eq!(span, 3 * HOUR_MS);
}

// ---- Account ----

#[tokio::test]
async fn test_positions_filtered_to_requested_symbols() {
    let (url, recorded) = serve(venue(Value::Null)).await;
    let client = client(&url);

    let positions = client.fetch_positions(&[BTC.to_string()]).await.unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0]["symbol"], BTC);
    assert_eq!(positions[0]["side"], "short");
    assert_eq!(positions[0]["contracts"], 0.5);
    assert_eq!(positions[0]["entryPrice"], 30000.0);
    assert_eq!(positions[0]["unrealizedPnl"], 12.5);
    assert_eq!(positions[0]["leverage"], 20);

    assert_eq!(requests_of(&recorded, "clearinghouseState")[0]["user"], WALLET);
}

#[tokio::test]
async fn test_positions_skip_unknown_coins() {
    let (url, _recorded) = serve(venue(Value::Null)).await;
    let positions = client(&url).fetch_positions(&[]).await.unwrap();

    let symbols: Vec<&str> = positions
        .iter()
        .filter_map(|p| p["symbol"].as_str())
        .collect();
    assert_eq!(symbols, vec![BTC, ETH]);
    assert_eq!(positions[1]["side"], "long");
}

#[tokio::test]
async fn test_open_orders_filtered_to_coin() {
    let (url, recorded) = serve(venue(Value::Null)).await;
    let orders = client(&url).fetch_open_orders(BTC).await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], 11);
    assert_eq!(orders[0]["side"], "buy");
    assert_eq!(orders[0]["price"], "29000.0");
    assert_eq!(orders[0]["symbol"], BTC);
    assert_eq!(requests_of(&recorded, "frontendOpenOrders")[0]["user"], WALLET);
}

// ---- Trading ----

#[tokio::test]
async fn test_limit_order_signed_and_resting() {
    let reply = order_reply(json!({"resting": {"oid": 77_738_308}}));
    let (url, recorded) = serve(venue(reply)).await;

    let result = client(&url)
        .create_order(BTC, OrderType::Limit, OrderSide::Buy, 0.01, Some(29000.0))
        .await
        .unwrap();
    assert_eq!(result["id"], 77_738_308);
    assert_eq!(result["status"], "open");

    let request = &requests_of(&recorded, "exchange")[0];
    let wire = &request["action"]["orders"][0];
    assert_eq!(request["action"]["type"], "order");
    assert_eq!(wire["a"], 0);
    assert_eq!(wire["b"], true);
    assert_eq!(wire["p"], "29000");
    assert_eq!(wire["s"], "0.01");
    assert_eq!(wire["t"]["limit"]["tif"], "Gtc");
    assert!(request["nonce"].as_u64().unwrap() > 0);
    assert!(request["signature"]["r"].as_str().unwrap().starts_with("0x"));
    assert!(matches!(request["signature"]["v"].as_u64(), Some(27 | 28)));
    assert!(request["vaultAddress"].is_null());
}

#[tokio::test]
async fn test_market_order_is_ioc_through_mid() {
    let reply = order_reply(json!({"filled": {"totalSz": "0.02", "avgPx": "29990.0", "oid": 42}}));
    let (url, recorded) = serve(venue(reply)).await;

    let result = client(&url)
        .create_order(BTC, OrderType::Market, OrderSide::Sell, 0.02, None)
        .await
        .unwrap();
    assert_eq!(result["id"], 42);
    assert_eq!(result["status"], "closed");

    assert_eq!(requests_of(&recorded, "allMids").len(), 1);
    let wire = &requests_of(&recorded, "exchange")[0]["action"]["orders"][0];
    assert_eq!(wire["b"], false);
    assert_eq!(wire["p"], "28500");
    assert_eq!(wire["t"]["limit"]["tif"], "Ioc");
}

#[tokio::test]
async fn test_order_status_error_is_invalid_request() {
    let reply = order_reply(json!({"error": "Insufficient margin to place order."}));
    let (url, _recorded) = serve(venue(reply)).await;

    let err = client(&url)
        .create_order(BTC, OrderType::Limit, OrderSide::Buy, 1.0, Some(29000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidRequest(m) if m.contains("Insufficient margin")));
}

#[tokio::test]
async fn test_err_envelope_for_unknown_wallet_is_authentication() {
    let reply = json!({"status": "err", "response": "User or API Wallet 0xabc does not exist."});
    let (url, _recorded) = serve(venue(reply)).await;

    let err = client(&url)
        .create_order(BTC, OrderType::Limit, OrderSide::Buy, 1.0, Some(29000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Authentication(_)));
}

#[tokio::test]
async fn test_cancel_over_http() {
    let reply = json!({"status": "ok", "response": {"type": "cancel", "data": {"statuses": ["success"]}}});
    let (url, recorded) = serve(venue(reply)).await;

    let result = client(&url).cancel_order("77738308", ETH).await.unwrap();
    assert_eq!(result["id"], "77738308");
    assert_eq!(result["status"], "canceled");

    let action = &requests_of(&recorded, "exchange")[0]["action"];
    assert_eq!(action["type"], "cancel");
    assert_eq!(action["cancels"][0]["a"], 1);
    assert_eq!(action["cancels"][0]["o"], 77_738_308);
}

// ---- Failure Classification ----

#[tokio::test]
async fn test_http_429_is_rate_limited() {
    let (url, _recorded) = serve(fixed(429, "\"slow down\"")).await;
    let client = client(&url);

    let err = client.load_markets().await.unwrap_err();
    assert!(matches!(err, ExchangeError::RateLimited(m) if m.contains("slow down")));
    assert_eq!(
        client
            .metrics()
            .requests_total
            .with_label_values(&["info", "rate_limited"])
            .get(),
        1
    );
}

#[tokio::test]
async fn test_http_500_is_unavailable() {
    let (url, _recorded) = serve(fixed(500, "\"down\"")).await;
    let err = client(&url).fetch_order_book(BTC).await.unwrap_err();
    assert!(matches!(err, ExchangeError::ExchangeUnavailable(_)));
}

#[tokio::test]
async fn test_http_400_is_invalid_request() {
    let (url, _recorded) = serve(fixed(400, "\"bad\"")).await;
    let err = client(&url).load_markets().await.unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_undecodable_body_is_malformed() {
    let (url, _recorded) = serve(fixed(200, "<html>gateway</html>")).await;
    let client = client(&url);

    let err = client.load_markets().await.unwrap_err();
    assert!(matches!(err, ExchangeError::MalformedResponse(_)));
    assert_eq!(
        client
            .metrics()
            .requests_total
            .with_label_values(&["info", "malformed"])
            .get(),
        1
    );
}

#[tokio::test]
async fn test_unknown_symbol_is_bad_symbol_after_load() {
    let (url, _recorded) = serve(venue(Value::Null)).await;
    let err = client(&url).fetch_order_book("DOGE/USDC:USDC").await.unwrap_err();
    assert!(matches!(err, ExchangeError::BadSymbol { symbol } if symbol == "DOGE/USDC:USDC"));
}
