//! In-memory market record cache with TTL and a periodic sweep.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::clock::{to_chrono, Clock, SystemClock};
use crate::models::MarketRecord;

/// Lower bound for the sweep period; `tokio::time::interval` rejects zero.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// A cached record and the instant it was (nominally) fetched.
#[derive(Clone, Copy, Debug)]
pub struct CacheEntry {
    pub record: MarketRecord,
    pub timestamp: DateTime<Utc>,
}

/// Asset identifier -> (record, timestamp) map with a fixed TTL.
///
/// Entries are only ever replaced whole, under a short non-async lock, so
/// readers never see a partially written entry. Reads treat entries older than
/// the TTL as misses; the sweeper removes them to bound memory.
pub struct MarketCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl MarketCache {
    /// Create a cache on wall-clock time.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache on an injected clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
            sweeper: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current time according to the cache's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Whether something stamped at `timestamp` is younger than the TTL.
    pub fn is_fresh(&self, timestamp: DateTime<Utc>) -> bool {
        self.now().signed_duration_since(timestamp) < to_chrono(self.ttl)
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Market cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Market cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_sweeper(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.sweeper
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Raw entry lookup, regardless of age.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.read_entries().get(key).copied()
    }

    /// Returns the record if present and younger than the TTL.
    pub fn get_fresh(&self, key: &str) -> Option<MarketRecord> {
        let entry = self.entry(key)?;
        if self.is_fresh(entry.timestamp) {
            Some(entry.record)
        } else {
            None
        }
    }

    /// Store a record stamped with the current time.
    pub fn insert(&self, key: &str, record: MarketRecord) {
        self.insert_at(key, record, self.now());
    }

    /// Store a record with an explicit timestamp (used to backdate fallback data).
    pub fn insert_at(&self, key: &str, record: MarketRecord, timestamp: DateTime<Utc>) {
        self.write_entries()
            .insert(key.to_string(), CacheEntry { record, timestamp });
    }

    /// Remove every entry whose age exceeds the TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now();
        let ttl = to_chrono(self.ttl);
        let mut entries = self.write_entries();
        let before = entries.len();
        entries.retain(|_, entry| now.signed_duration_since(entry.timestamp) <= ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Start the periodic sweep, one run per TTL. No-op if already running.
    ///
    /// Must be called from within a Tokio runtime. The task only holds a weak
    /// reference and ends on its own once the cache is dropped.
    pub fn start_sweeper(self: &Arc<Self>) {
        let mut sweeper = self.lock_sweeper();
        if sweeper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let cache = Arc::downgrade(self);
        let period = self.ttl.max(MIN_SWEEP_INTERVAL);

        *sweeper = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!("Market cache sweep removed {} expired entries", removed);
                }
            }
        }));
        debug!("Market cache sweeper started (every {:?})", period);
    }

    /// Stop the periodic sweep if it is running.
    pub fn stop_sweeper(&self) {
        if let Some(handle) = self.lock_sweeper().take() {
            handle.abort();
            debug!("Market cache sweeper stopped");
        }
    }

    pub fn is_sweeping(&self) -> bool {
        self.lock_sweeper()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for MarketCache {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}

impl std::fmt::Debug for MarketCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const TTL: Duration = Duration::from_secs(60);

    fn record(price: f64) -> MarketRecord {
        MarketRecord {
            price,
            market_cap: 1_000.0,
            volume_24h: 100.0,
            change_24h: 0.5,
            rank: 1,
        }
    }

    fn cache_with_clock() -> (Arc<MarketCache>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = Arc::new(MarketCache::with_clock(TTL, clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_get_fresh_within_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.insert("eth", record(10.0));

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get_fresh("eth"), Some(record(10.0)));
    }

    #[test]
    fn test_stale_entry_is_a_miss_but_kept() {
        let (cache, clock) = cache_with_clock();
        cache.insert("eth", record(10.0));

        clock.advance(TTL);
        assert_eq!(cache.get_fresh("eth"), None);
        // Reads never delete; only the sweep does.
        assert!(cache.entry("eth").is_some());
    }

    #[test]
    fn test_insert_replaces_whole_entry() {
        let (cache, _clock) = cache_with_clock();
        cache.insert("sol", record(1.0));
        cache.insert("sol", record(2.0));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_fresh("sol"), Some(record(2.0)));
    }

    #[test]
    fn test_backdated_insert() {
        let (cache, clock) = cache_with_clock();
        let backdated = cache.now() - chrono::Duration::seconds(30);
        cache.insert_at("pol", record(0.28), backdated);

        assert!(cache.get_fresh("pol").is_some());
        clock.advance(Duration::from_secs(30));
        assert!(cache.get_fresh("pol").is_none());
    }

    #[test]
    fn test_purge_only_removes_expired() {
        let (cache, clock) = cache_with_clock();
        cache.insert("eth", record(1.0));
        clock.advance(Duration::from_secs(61));
        cache.insert("sol", record(2.0));

        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.entry("eth").is_none());
        assert_eq!(cache.get_fresh("sol"), Some(record(2.0)));

        // Idempotent
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_every_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.insert("eth", record(1.0));
        clock.advance(Duration::from_secs(61));
        cache.insert("sol", record(2.0));

        cache.start_sweeper();
        assert!(cache.is_sweeping());
        assert_eq!(cache.len(), 2);

        tokio::time::sleep(TTL + Duration::from_secs(1)).await;

        assert_eq!(cache.len(), 1);
        assert!(cache.get_fresh("sol").is_some());

        cache.stop_sweeper();
        assert!(!cache.is_sweeping());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_sweeper_leaves_entries() {
        let (cache, clock) = cache_with_clock();
        cache.start_sweeper();
        cache.stop_sweeper();

        cache.insert("eth", record(1.0));
        clock.advance(Duration::from_secs(120));
        tokio::time::sleep(TTL * 3).await;

        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_start_sweeper_is_idempotent() {
        let (cache, _clock) = cache_with_clock();
        cache.start_sweeper();
        cache.start_sweeper();
        assert!(cache.is_sweeping());
        cache.stop_sweeper();
        assert!(!cache.is_sweeping());
    }
}
