use std::sync::Arc;

use crate::config::{Config, StoreConfig};
use planets_market_data::{
    CoinrankingProvider, MarketDataProvider, MarketDataResolver, MarketStore, SupabaseStore,
};
use planets_storage_sqlite::SqliteMarketStore;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub resolver: MarketDataResolver,
    pub store_kind: &'static str,
}

pub fn init_tracing() {
    let log_format = std::env::var("PLANETS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn build_store(config: &Config) -> anyhow::Result<Arc<dyn MarketStore>> {
    let store: Arc<dyn MarketStore> = match &config.store {
        StoreConfig::Supabase { url, anon_key } => {
            info!("Using Supabase store at {}", url);
            Arc::new(SupabaseStore::new(
                url,
                anon_key.clone(),
                config.market.request_timeout,
            ))
        }
        StoreConfig::Sqlite { db_path } => {
            info!("Using SQLite store at {}", db_path);
            Arc::new(SqliteMarketStore::open(db_path)?)
        }
    };
    Ok(store)
}

/// Wires the resolver against Coinranking.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    if config.market.api_key.is_empty() {
        warn!("COINRANKING_API_KEY is not set; requests will be sent without an access token");
    }
    let provider = Arc::new(CoinrankingProvider::with_base_url(
        config.market.api_base_url.clone(),
        config.market.api_key.clone(),
        config.market.request_timeout,
    ));
    build_state_with_provider(config, provider).await
}

/// Wires the resolver against any provider and starts the cache sweeper.
pub async fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn MarketDataProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let store = build_store(config)?;
    let resolver = MarketDataResolver::from_config(&config.market, provider, Some(store))?;
    resolver.cache().start_sweeper();

    info!(
        "Market data resolver ready (ttl {:?}, {} retries)",
        config.market.cache_ttl, config.market.retry.max_retries
    );

    Ok(Arc::new(AppState {
        resolver,
        store_kind: config.store.kind(),
    }))
}
