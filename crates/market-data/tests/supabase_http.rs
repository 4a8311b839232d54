//! Supabase store against a local Axum server speaking PostgREST.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{TimeZone, Utc};
use planets_market_data::{MarketDataError, MarketStore, PersistentRecord, SupabaseStore};
use serde_json::{json, Value};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct Captured {
    query: Option<String>,
    headers: HeaderMap,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct TestServerState {
    last_select: Arc<Mutex<Option<Captured>>>,
    last_upsert: Arc<Mutex<Option<Captured>>>,
}

async fn select_rows(
    State(state): State<TestServerState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> impl IntoResponse {
    let planet = query
        .as_deref()
        .unwrap_or_default()
        .split('&')
        .find_map(|pair| pair.strip_prefix("planet=eq."))
        .unwrap_or_default()
        .to_string();
    *state.last_select.lock().await = Some(Captured {
        query,
        headers,
        body: None,
    });

    match planet.as_str() {
        "eth" => Json(json!([{
            "id": 1,
            "planet": "eth",
            "price": "2317.32",
            "market_cap": "279420000000",
            "volume_24h": 25090000000u64,
            "change_24h": "-5.33",
            "rank": 2,
            "updated_at": "2024-05-01T12:00:00+00:00",
            "created_at": "2024-04-01T08:00:00+00:00"
        }]))
        .into_response(),
        "broken" => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key"})),
        )
            .into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn upsert_row(
    State(state): State<TestServerState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let rejected = body["planet"] == "broken";
    *state.last_upsert.lock().await = Some(Captured {
        query,
        headers,
        body: Some(body),
    });

    if rejected {
        StatusCode::CONFLICT
    } else {
        StatusCode::CREATED
    }
}

async fn start_test_server(state: TestServerState) -> SocketAddr {
    let router = Router::new()
        .route("/rest/v1/crypto_data", get(select_rows).post(upsert_row))
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

fn store(addr: SocketAddr) -> SupabaseStore {
    SupabaseStore::new(
        &format!("http://{}", addr),
        "anon-key".to_string(),
        Duration::from_secs(5),
    )
}

fn assert_authorized(headers: &HeaderMap) {
    assert_eq!(headers["apikey"], "anon-key");
    assert_eq!(headers["authorization"], "Bearer anon-key");
}

#[tokio::test]
async fn test_get_filters_by_planet() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;

    let row = store(addr).get("eth").await.unwrap().unwrap();
    assert_eq!(row.identifier, "eth");
    assert_eq!(row.price, 2317.32);
    assert_eq!(row.rank, 2);
    assert_eq!(
        row.updated_at,
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    );

    let select = state.last_select.lock().await.clone().unwrap();
    let query = select.query.unwrap();
    assert!(query.contains("planet=eq.eth"));
    assert!(query.contains("select="));
    assert!(query.contains("limit=1"));
    assert_authorized(&select.headers);
}

#[tokio::test]
async fn test_get_missing_row_is_none() {
    let addr = start_test_server(TestServerState::default()).await;

    assert!(store(addr).get("tron").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_error_status_is_store_error() {
    let addr = start_test_server(TestServerState::default()).await;

    let result = store(addr).get("broken").await;
    assert!(matches!(result, Err(MarketDataError::Store { .. })));
}

#[tokio::test]
async fn test_upsert_merges_on_planet() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;

    let record = PersistentRecord {
        identifier: "sol".to_string(),
        price: 149.32,
        market_cap: 72_900_000_000.0,
        volume_24h: 2_870_000_000.0,
        change_24h: 1.25,
        rank: 6,
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        created_at: None,
    };
    store(addr).upsert(&record).await.unwrap();

    let upsert = state.last_upsert.lock().await.clone().unwrap();
    assert_eq!(upsert.query.as_deref(), Some("on_conflict=planet"));
    assert_eq!(
        upsert.headers["prefer"],
        "resolution=merge-duplicates,return=minimal"
    );
    assert_authorized(&upsert.headers);

    let body = upsert.body.unwrap();
    assert_eq!(body["planet"], "sol");
    assert_eq!(body["rank"], 6);
    assert_eq!(body["updated_at"], "2024-05-01T12:00:00Z");
    assert!(body.get("created_at").is_none());
}

#[tokio::test]
async fn test_upsert_error_status_is_store_error() {
    let addr = start_test_server(TestServerState::default()).await;

    let record = PersistentRecord {
        identifier: "broken".to_string(),
        price: 1.0,
        market_cap: 1.0,
        volume_24h: 1.0,
        change_24h: 0.0,
        rank: 1,
        updated_at: Utc::now(),
        created_at: None,
    };
    let result = store(addr).upsert(&record).await;
    assert!(matches!(result, Err(MarketDataError::Store { .. })));
}
