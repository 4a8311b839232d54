use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::PersistentRecord;

/// Durable key-value store of the last good record per asset.
///
/// Implementations must be safe to call concurrently. The resolver treats
/// every error as "store unavailable" and moves on, so implementations should
/// not retry internally.
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Short name used in errors and logs, e.g. "SUPABASE".
    fn id(&self) -> &'static str;

    /// Fetch the row for `identifier`, if there is one.
    async fn get(&self, identifier: &str) -> Result<Option<PersistentRecord>, MarketDataError>;

    /// Insert or replace the row keyed by `record.identifier`.
    ///
    /// Replacing keeps the original `created_at`.
    async fn upsert(&self, record: &PersistentRecord) -> Result<(), MarketDataError>;
}
