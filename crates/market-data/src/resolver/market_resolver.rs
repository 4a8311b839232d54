use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, warn};

use super::lookup::{Lookup, Resolution, ResolutionSource};
use crate::cache::{to_chrono, MarketCache};
use crate::client::MarketDataClient;
use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::fallback::FallbackTable;
use crate::models::{AssetId, MarketRecord, PersistentRecord};
use crate::provider::MarketDataProvider;
use crate::store::MarketStore;

type InFlight = Shared<BoxFuture<'static, Option<Resolution>>>;

struct ResolverInner {
    cache: Arc<MarketCache>,
    store: Option<Arc<dyn MarketStore>>,
    client: MarketDataClient,
    fallback: FallbackTable,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

impl ResolverInner {
    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, InFlight>> {
        self.in_flight.lock().unwrap_or_else(|poisoned| {
            warn!("In-flight map lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// Resolves an asset identifier to a [`MarketRecord`].
///
/// Cheap to clone; clones share the cache, store, client and in-flight map.
/// Resolution never fails: every layer error is logged and the next layer is
/// tried, ending in `None` only for identifiers without fallback data.
#[derive(Clone)]
pub struct MarketDataResolver {
    inner: Arc<ResolverInner>,
}

impl MarketDataResolver {
    pub fn new(
        cache: Arc<MarketCache>,
        store: Option<Arc<dyn MarketStore>>,
        client: MarketDataClient,
        fallback: FallbackTable,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                cache,
                store,
                client,
                fallback,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Wires a resolver on wall-clock time with the built-in fallback table.
    pub fn from_config(
        config: &MarketDataConfig,
        provider: Arc<dyn MarketDataProvider>,
        store: Option<Arc<dyn MarketStore>>,
    ) -> Result<Self, MarketDataError> {
        config.validate()?;

        let cache = Arc::new(MarketCache::new(config.cache_ttl));
        let client = MarketDataClient::new(provider, config.retry, config.request_timeout);

        Ok(Self::new(cache, store, client, FallbackTable::builtin()))
    }

    pub fn cache(&self) -> &Arc<MarketCache> {
        &self.inner.cache
    }

    /// Resolve one identifier (case-insensitive).
    pub async fn resolve(&self, identifier: &str) -> Option<MarketRecord> {
        self.resolve_detailed(identifier)
            .await
            .map(|resolution| resolution.record)
    }

    /// Like [`resolve`](Self::resolve), but also reports which layer answered.
    pub async fn resolve_detailed(&self, identifier: &str) -> Option<Resolution> {
        let key = AssetId::normalize(identifier);

        let asset = match key.parse::<AssetId>() {
            Ok(asset) => asset,
            Err(_) => {
                warn!("Unknown asset identifier: {:?}", identifier);
                return self
                    .lookup_fallback(&key)
                    .into_option()
                    .map(|record| Resolution {
                        record,
                        source: ResolutionSource::Fallback,
                    });
            }
        };

        if let Lookup::Hit(record) = self.lookup_cache(&key) {
            return Some(Resolution {
                record,
                source: ResolutionSource::Cache,
            });
        }

        let walk = {
            let mut in_flight = self.inner.lock_in_flight();
            match in_flight.get(&key) {
                Some(existing) => existing.clone(),
                None => {
                    // A walk may have completed since the check above.
                    if let Lookup::Hit(record) = self.lookup_cache(&key) {
                        return Some(Resolution {
                            record,
                            source: ResolutionSource::Cache,
                        });
                    }
                    let walk = self.spawn_walk(asset, key.clone());
                    in_flight.insert(key, walk.clone());
                    walk
                }
            }
        };

        walk.await
    }

    /// Resolve every tracked asset concurrently, in display order.
    ///
    /// Assets that resolve to nothing are left out.
    pub async fn resolve_all(&self) -> Vec<(AssetId, MarketRecord)> {
        let lookups = AssetId::ALL
            .into_iter()
            .map(|asset| async move { (asset, self.resolve(asset.as_str()).await) });
        futures::future::join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(asset, record)| record.map(|record| (asset, record)))
            .collect()
    }

    /// Runs the walk on its own task so it completes even if every waiter
    /// is dropped. Callers must hold the in-flight lock until the returned
    /// future is registered.
    fn spawn_walk(&self, asset: AssetId, key: String) -> InFlight {
        let this = self.clone();
        let task = tokio::spawn(async move {
            let resolution = this.walk_layers(asset, &key).await;
            this.inner.lock_in_flight().remove(&key);
            resolution
        });

        task.map(|joined| {
            joined.unwrap_or_else(|e| {
                warn!("Market data lookup task failed: {}", e);
                None
            })
        })
        .boxed()
        .shared()
    }

    async fn walk_layers(&self, asset: AssetId, key: &str) -> Option<Resolution> {
        if let Lookup::Hit(record) = self.lookup_store(key).await {
            self.inner.cache.insert(key, record);
            return Some(Resolution {
                record,
                source: ResolutionSource::Store,
            });
        }

        if let Lookup::Hit(record) = self.lookup_api(asset, key).await {
            return Some(Resolution {
                record,
                source: ResolutionSource::Api,
            });
        }

        match self.lookup_fallback(key) {
            Lookup::Hit(record) => {
                warn!("Serving fallback data for {}", key);
                // Half expired, so the API is retried after TTL/2.
                let cache = &self.inner.cache;
                let now = cache.now();
                let backdated = now
                    .checked_sub_signed(to_chrono(cache.ttl() / 2))
                    .unwrap_or(now);
                cache.insert_at(key, record, backdated);
                Some(Resolution {
                    record,
                    source: ResolutionSource::Fallback,
                })
            }
            Lookup::Miss => None,
        }
    }

    fn lookup_cache(&self, key: &str) -> Lookup {
        self.inner.cache.get_fresh(key).into()
    }

    async fn lookup_store(&self, key: &str) -> Lookup {
        let Some(store) = &self.inner.store else {
            return Lookup::Miss;
        };

        match store.get(key).await {
            Ok(Some(row)) if self.inner.cache.is_fresh(row.updated_at) => {
                debug!("{} served {} (updated {})", store.id(), key, row.updated_at);
                Lookup::Hit(row.to_record())
            }
            Ok(Some(row)) => {
                debug!("{} row for {} is stale (updated {})", store.id(), key, row.updated_at);
                Lookup::Miss
            }
            Ok(None) => Lookup::Miss,
            Err(e) => {
                warn!("Failed to read {} from {}: {}", key, store.id(), e);
                Lookup::Miss
            }
        }
    }

    async fn lookup_api(&self, asset: AssetId, key: &str) -> Lookup {
        match self.inner.client.fetch(asset).await {
            Ok(record) => {
                self.inner.cache.insert(key, record);
                self.persist(key, record);
                Lookup::Hit(record)
            }
            Err(e) => {
                warn!(
                    "All {} attempts for {} failed: {}",
                    self.inner.client.provider_id(),
                    key,
                    e
                );
                Lookup::Miss
            }
        }
    }

    fn lookup_fallback(&self, key: &str) -> Lookup {
        self.inner.fallback.get(key).into()
    }

    /// Upserts in the background; the caller never waits on the store.
    fn persist(&self, key: &str, record: MarketRecord) {
        let Some(store) = self.inner.store.clone() else {
            return;
        };
        let row = PersistentRecord::from_record(key, &record, self.inner.cache.now());

        tokio::spawn(async move {
            match store.upsert(&row).await {
                Ok(()) => debug!("Persisted {} to {}", row.identifier, store.id()),
                Err(e) => warn!("Failed to persist {} to {}: {}", row.identifier, store.id(), e),
            }
        });
    }
}
