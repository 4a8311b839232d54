//! Coinranking provider for crypto market data.
//!
//! Fetches a single coin from the v2 API:
//!
//! ```text
//! GET {base_url}/coin/{uuid}
//! x-access-token: {api_key}
//! ```
//!
//! The interesting part of the response is `data.coin`. Coinranking encodes
//! most numbers as strings (`"price": "2317.32"`), so every numeric field goes
//! through the lenient helpers in `models::numeric`.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::client::DEFAULT_REQUEST_TIMEOUT;
use crate::errors::MarketDataError;
use crate::models::numeric::{f64_from_any, u32_from_any};
use crate::models::{AssetId, MarketRecord};
use crate::provider::MarketDataProvider;

/// Provider ID constant
const PROVIDER_ID: &str = "COINRANKING";

/// Public API root
pub const DEFAULT_BASE_URL: &str = "https://api.coinranking.com/v2";

/// The `data.coin` object of a coin response.
#[derive(Debug, Deserialize)]
struct CoinPayload {
    #[serde(deserialize_with = "f64_from_any")]
    price: f64,
    #[serde(rename = "marketCap", deserialize_with = "f64_from_any")]
    market_cap: f64,
    #[serde(rename = "24hVolume", deserialize_with = "f64_from_any")]
    volume_24h: f64,
    #[serde(deserialize_with = "f64_from_any")]
    change: f64,
    #[serde(deserialize_with = "u32_from_any")]
    rank: u32,
}

impl From<CoinPayload> for MarketRecord {
    fn from(coin: CoinPayload) -> Self {
        MarketRecord {
            price: coin.price,
            market_cap: coin.market_cap,
            volume_24h: coin.volume_24h,
            change_24h: coin.change,
            rank: coin.rank,
        }
    }
}

/// Coinranking v2 provider.
///
/// # Example
///
/// ```ignore
/// use planets_market_data::provider::CoinrankingProvider;
///
/// let provider = CoinrankingProvider::new("your_api_key".to_string());
/// ```
pub struct CoinrankingProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CoinrankingProvider {
    /// Create a provider against the public API.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a provider against another API root (proxies, test servers).
    pub fn with_base_url(base_url: String, api_key: String, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn coin_url(&self, asset: AssetId) -> String {
        format!("{}/coin/{}", self.base_url, asset.coinranking_uuid())
    }
}

/// Extracts a record from a raw coin response body.
pub fn parse_coin_response(body: &str) -> Result<MarketRecord, MarketDataError> {
    let bad = |message: String| MarketDataError::BadResponse {
        provider: PROVIDER_ID.to_string(),
        message,
    };

    let mut value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| bad(format!("invalid JSON: {}", e)))?;

    let coin = value
        .get_mut("data")
        .and_then(|data| data.get_mut("coin"))
        .filter(|coin| coin.is_object())
        .map(serde_json::Value::take)
        .ok_or_else(|| bad("missing data.coin".to_string()))?;

    let payload: CoinPayload =
        serde_json::from_value(coin).map_err(|e| bad(format!("invalid coin: {}", e)))?;

    Ok(payload.into())
}

#[async_trait]
impl MarketDataProvider for CoinrankingProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_record(&self, asset: AssetId) -> Result<MarketRecord, MarketDataError> {
        let url = self.coin_url(asset);
        debug!("Fetching {} from {}", asset, url);

        let response = self
            .client
            .get(&url)
            .header("x-access-token", &self.api_key)
            .header(CACHE_CONTROL, "max-age=7200")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::HttpStatus {
                provider: PROVIDER_ID.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_coin_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_numerics() {
        let body = r#"{
            "status": "success",
            "data": {
                "coin": {
                    "uuid": "razxDUgYGNAdQ",
                    "symbol": "ETH",
                    "price": "2317.32",
                    "marketCap": "279420000000",
                    "24hVolume": "25090000000",
                    "change": "-5.33",
                    "rank": 2
                }
            }
        }"#;

        let record = parse_coin_response(body).unwrap();
        assert_eq!(record.price, 2317.32);
        assert_eq!(record.market_cap, 279_420_000_000.0);
        assert_eq!(record.volume_24h, 25_090_000_000.0);
        assert_eq!(record.change_24h, -5.33);
        assert_eq!(record.rank, 2);
    }

    #[test]
    fn test_parse_plain_numbers() {
        let body = r#"{"data":{"coin":{"price":149.32,"marketCap":72900000000,"24hVolume":2870000000,"change":1.25,"rank":6}}}"#;
        let record = parse_coin_response(body).unwrap();
        assert_eq!(record.rank, 6);
        assert_eq!(record.change_24h, 1.25);
    }

    #[test]
    fn test_missing_coin_is_bad_response() {
        for body in [
            r#"{"status":"success","data":{}}"#,
            r#"{"status":"fail"}"#,
            r#"{"data":{"coin":null}}"#,
        ] {
            let err = parse_coin_response(body).unwrap_err();
            assert!(
                matches!(err, MarketDataError::BadResponse { .. }),
                "unexpected {:?} for {}",
                err,
                body
            );
        }
    }

    #[test]
    fn test_invalid_fields_are_bad_response() {
        let body = r#"{"data":{"coin":{"price":"n/a","marketCap":"1","24hVolume":"1","change":"0","rank":1}}}"#;
        assert!(matches!(
            parse_coin_response(body),
            Err(MarketDataError::BadResponse { .. })
        ));

        assert!(matches!(
            parse_coin_response("<html>503</html>"),
            Err(MarketDataError::BadResponse { .. })
        ));
    }

    #[test]
    fn test_coin_url() {
        let provider = CoinrankingProvider::with_base_url(
            "http://localhost:9999/v2/".to_string(),
            "k".into(),
            DEFAULT_REQUEST_TIMEOUT,
        );
        assert_eq!(
            provider.coin_url(AssetId::Sol),
            "http://localhost:9999/v2/coin/zNZHO_Sjf"
        );
        assert_eq!(provider.id(), "COINRANKING");
    }
}
