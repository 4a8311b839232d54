use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use planets_market_data::MarketDataConfig;

/// Where the resolver persists records between restarts.
#[derive(Clone, Debug)]
pub enum StoreConfig {
    /// Hosted `crypto_data` table behind PostgREST.
    Supabase { url: String, anon_key: String },
    /// Local SQLite file.
    Sqlite { db_path: String },
}

impl StoreConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreConfig::Supabase { .. } => "supabase",
            StoreConfig::Sqlite { .. } => "sqlite",
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub static_dir: Option<String>,
    pub cors_allow: Vec<String>,
    pub store: StoreConfig,
    pub market: MarketDataConfig,
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {:?}", key, raw)),
        _ => Ok(default),
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = env_or("PLANETS_LISTEN_ADDR", "0.0.0.0:8088".parse()?)?;
        let static_dir = env_opt("PLANETS_STATIC_DIR");
        let cors_allow = std::env::var("PLANETS_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let store = match (env_opt("SUPABASE_URL"), env_opt("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => StoreConfig::Supabase { url, anon_key },
            _ => StoreConfig::Sqlite {
                db_path: env_opt("PLANETS_DB_PATH").unwrap_or_else(|| "./data/planets.db".into()),
            },
        };

        let defaults = MarketDataConfig::default();
        let ttl_secs: u64 = env_or("PLANETS_CACHE_TTL_SECS", defaults.cache_ttl.as_secs())?;
        let mut retry = defaults.retry;
        retry.max_retries = env_or("PLANETS_MAX_RETRIES", retry.max_retries)?;

        let market = MarketDataConfig {
            cache_ttl: Duration::from_secs(ttl_secs),
            request_timeout: defaults.request_timeout,
            retry,
            api_base_url: env_opt("COINRANKING_BASE_URL").unwrap_or(defaults.api_base_url),
            api_key: env_opt("COINRANKING_API_KEY").unwrap_or_default(),
        };

        Ok(Self {
            listen_addr,
            static_dir,
            cors_allow,
            store,
            market,
        })
    }
}
