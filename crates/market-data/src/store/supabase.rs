//! Supabase (PostgREST) store for the `crypto_data` table.
//!
//! Reads use `?planet=eq.{id}&select=*&limit=1`; writes POST with
//! `on_conflict=planet` and `Prefer: resolution=merge-duplicates`, which
//! PostgREST turns into `INSERT ... ON CONFLICT (planet) DO UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{parse_timestamp, MarketStore};
use crate::errors::MarketDataError;
use crate::models::numeric::{f64_from_any, u32_from_any};
use crate::models::PersistentRecord;

const STORE_ID: &str = "SUPABASE";

const TABLE: &str = "crypto_data";

/// Row as returned by PostgREST. `numeric` columns may arrive as strings.
#[derive(Debug, Deserialize)]
struct CryptoDataRow {
    planet: String,
    #[serde(deserialize_with = "f64_from_any")]
    price: f64,
    #[serde(deserialize_with = "f64_from_any")]
    market_cap: f64,
    #[serde(deserialize_with = "f64_from_any")]
    volume_24h: f64,
    #[serde(deserialize_with = "f64_from_any")]
    change_24h: f64,
    #[serde(deserialize_with = "u32_from_any")]
    rank: u32,
    updated_at: String,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<CryptoDataRow> for PersistentRecord {
    type Error = MarketDataError;

    fn try_from(row: CryptoDataRow) -> Result<Self, Self::Error> {
        let updated_at = parse_timestamp(&row.updated_at).ok_or_else(|| {
            MarketDataError::store(
                STORE_ID,
                format!("invalid updated_at for {}: {:?}", row.planet, row.updated_at),
            )
        })?;

        Ok(PersistentRecord {
            identifier: row.planet,
            price: row.price,
            market_cap: row.market_cap,
            volume_24h: row.volume_24h,
            change_24h: row.change_24h,
            rank: row.rank,
            updated_at,
            created_at: row.created_at.as_deref().and_then(parse_timestamp),
        })
    }
}

/// Body of an upsert. `created_at` is left to the column default.
#[derive(Debug, Serialize)]
struct UpsertBody<'a> {
    planet: &'a str,
    price: f64,
    market_cap: f64,
    volume_24h: f64,
    change_24h: f64,
    rank: u32,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a PersistentRecord> for UpsertBody<'a> {
    fn from(record: &'a PersistentRecord) -> Self {
        Self {
            planet: &record.identifier,
            price: record.price,
            market_cap: record.market_cap,
            volume_24h: record.volume_24h,
            change_24h: record.change_24h,
            rank: record.rank,
            updated_at: record.updated_at,
        }
    }
}

/// Store backed by a Supabase project's REST endpoint.
pub struct SupabaseStore {
    client: Client,
    table_url: String,
    anon_key: String,
}

impl SupabaseStore {
    /// `project_url` is the project root, e.g. `https://abc.supabase.co`.
    pub fn new(project_url: &str, anon_key: String, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            table_url: format!("{}/rest/v1/{}", project_url.trim_end_matches('/'), TABLE),
            anon_key,
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
    }
}

fn parse_rows(body: &str) -> Result<Option<PersistentRecord>, MarketDataError> {
    let rows: Vec<CryptoDataRow> = serde_json::from_str(body)
        .map_err(|e| MarketDataError::store(STORE_ID, format!("invalid row: {}", e)))?;

    rows.into_iter()
        .next()
        .map(PersistentRecord::try_from)
        .transpose()
}

#[async_trait]
impl MarketStore for SupabaseStore {
    fn id(&self) -> &'static str {
        STORE_ID
    }

    async fn get(&self, identifier: &str) -> Result<Option<PersistentRecord>, MarketDataError> {
        let planet_filter = format!("eq.{}", identifier);
        let response = self
            .authorized(self.client.get(&self.table_url))
            .query(&[
                ("planet", planet_filter.as_str()),
                ("select", "*"),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| MarketDataError::store(STORE_ID, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::store(
                STORE_ID,
                format!("select returned status {}", status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::store(STORE_ID, e))?;
        parse_rows(&body)
    }

    async fn upsert(&self, record: &PersistentRecord) -> Result<(), MarketDataError> {
        let response = self
            .authorized(self.client.post(&self.table_url))
            .query(&[("on_conflict", "planet")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&UpsertBody::from(record))
            .send()
            .await
            .map_err(|e| MarketDataError::store(STORE_ID, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::store(
                STORE_ID,
                format!("upsert returned status {}", status.as_u16()),
            ));
        }
        Ok(())
    }
}
