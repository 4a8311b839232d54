//! Market data provider trait definitions.
//!
//! This module defines the `MarketDataProvider` trait that the external
//! market data source must implement.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{AssetId, MarketRecord};

/// Trait for market data providers.
///
/// A provider performs exactly one request per call; retries, timeouts and
/// backoff are layered on top by [`MarketDataClient`](crate::client::MarketDataClient).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use planets_market_data::provider::MarketDataProvider;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn fetch_record(&self, asset: AssetId) -> Result<MarketRecord, MarketDataError> {
///         // ... one HTTP round trip
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "COINRANKING". Used in errors and logs.
    fn id(&self) -> &'static str;

    /// Fetch the current market record for one asset.
    ///
    /// # Errors
    ///
    /// - `RateLimited` when the provider answers 429
    /// - `HttpStatus` for any other non-success status
    /// - `BadResponse` when the body lacks the expected fields
    /// - `Network` for transport failures
    async fn fetch_record(&self, asset: AssetId) -> Result<MarketRecord, MarketDataError>;
}
