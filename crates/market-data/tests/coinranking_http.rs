//! Coinranking provider against a local Axum server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use planets_market_data::{AssetId, CoinrankingProvider, MarketDataError, MarketDataProvider};
use serde_json::json;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct TestServerState {
    last_headers: Arc<Mutex<Option<HeaderMap>>>,
}

async fn get_coin(
    State(state): State<TestServerState>,
    Path(uuid): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    *state.last_headers.lock().await = Some(headers);

    if uuid == AssetId::Eth.coinranking_uuid() {
        return Json(json!({
            "status": "success",
            "data": {
                "coin": {
                    "uuid": uuid,
                    "symbol": "ETH",
                    "price": "2317.32",
                    "marketCap": "279420000000",
                    "24hVolume": "25090000000",
                    "change": "-5.33",
                    "rank": 2
                }
            }
        }))
        .into_response();
    }
    if uuid == AssetId::Bsc.coinranking_uuid() {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"status": "fail", "code": "RATE_LIMIT_EXCEEDED"})),
        )
            .into_response();
    }
    if uuid == AssetId::Arb.coinranking_uuid() {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if uuid == AssetId::Sol.coinranking_uuid() {
        tokio::time::sleep(Duration::from_millis(500)).await;
        return Json(json!({"data": {"coin": {}}})).into_response();
    }

    Json(json!({"status": "success", "data": {}})).into_response()
}

async fn start_test_server(state: TestServerState) -> SocketAddr {
    let router = Router::new()
        .route("/v2/coin/{uuid}", get(get_coin))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test server");
    let addr = listener.local_addr().expect("missing local addr");

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .expect("test server failed");
    });

    addr
}

fn provider(addr: SocketAddr, timeout: Duration) -> CoinrankingProvider {
    CoinrankingProvider::with_base_url(
        format!("http://{}/v2/", addr),
        "test-key".to_string(),
        timeout,
    )
}

#[tokio::test]
async fn test_fetch_sends_headers_and_parses_coin() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;

    let record = provider(addr, Duration::from_secs(5))
        .fetch_record(AssetId::Eth)
        .await
        .unwrap();
    assert_eq!(record.price, 2317.32);
    assert_eq!(record.market_cap, 279_420_000_000.0);
    assert_eq!(record.volume_24h, 25_090_000_000.0);
    assert_eq!(record.change_24h, -5.33);
    assert_eq!(record.rank, 2);

    let headers = state.last_headers.lock().await.clone().unwrap();
    assert_eq!(headers["x-access-token"], "test-key");
    assert_eq!(headers["cache-control"], "max-age=7200");
    assert_eq!(headers["pragma"], "no-cache");
}

#[tokio::test]
async fn test_429_is_rate_limited() {
    let addr = start_test_server(TestServerState::default()).await;

    let result = provider(addr, Duration::from_secs(5))
        .fetch_record(AssetId::Bsc)
        .await;
    assert!(matches!(result, Err(MarketDataError::RateLimited { .. })));
}

#[tokio::test]
async fn test_other_status_is_http_status() {
    let addr = start_test_server(TestServerState::default()).await;

    let result = provider(addr, Duration::from_secs(5))
        .fetch_record(AssetId::Arb)
        .await;
    assert!(matches!(
        result,
        Err(MarketDataError::HttpStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_missing_coin_is_bad_response() {
    let addr = start_test_server(TestServerState::default()).await;

    let result = provider(addr, Duration::from_secs(5))
        .fetch_record(AssetId::Tron)
        .await;
    assert!(matches!(result, Err(MarketDataError::BadResponse { .. })));
}

#[tokio::test]
async fn test_configured_timeout_is_applied() {
    let addr = start_test_server(TestServerState::default()).await;

    let result = provider(addr, Duration::from_millis(50))
        .fetch_record(AssetId::Sol)
        .await;
    match result {
        Err(MarketDataError::Network(e)) => assert!(e.is_timeout()),
        other => panic!("expected a timeout, got {:?}", other),
    }
}
