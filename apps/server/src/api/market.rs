use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use planets_market_data::{MarketRecord, ResolutionSource};
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const MAX_IDENTIFIER_LEN: usize = 32;

/// Rejects path segments that cannot be an asset identifier at all.
fn validate_identifier(raw: &str) -> ApiResult<&str> {
    let identifier = raw.trim();
    let well_formed = !identifier.is_empty()
        && identifier.len() <= MAX_IDENTIFIER_LEN
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Ok(identifier)
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid planet identifier: {:?}",
            raw
        )))
    }
}

/// Record for one planet, or `null` when nothing is known about it.
async fn get_market_record(
    Path(planet): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Option<MarketRecord>>> {
    let identifier = validate_identifier(&planet)?;
    Ok(Json(state.resolver.resolve(identifier).await))
}

#[derive(Serialize)]
struct ResolutionBody {
    record: Option<MarketRecord>,
    source: Option<ResolutionSource>,
}

/// Same lookup, also reporting which layer answered.
async fn get_market_resolution(
    Path(planet): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ResolutionBody>> {
    let identifier = validate_identifier(&planet)?;
    let resolution = state.resolver.resolve_detailed(identifier).await;
    Ok(Json(ResolutionBody {
        record: resolution.map(|r| r.record),
        source: resolution.map(|r| r.source),
    }))
}

/// Every planet that resolved, keyed by identifier.
async fn list_market_records(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<&'static str, MarketRecord>> {
    let records = state
        .resolver
        .resolve_all()
        .await
        .into_iter()
        .map(|(asset, record)| (asset.as_str(), record))
        .collect();
    Json(records)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market", get(list_market_records))
        .route("/market/{planet}", get(get_market_record))
        .route("/market/{planet}/resolution", get(get_market_resolution))
}
