//! Tunables for the resolver.

use std::time::Duration;

use crate::client::{RetryPolicy, DEFAULT_REQUEST_TIMEOUT};
use crate::errors::MarketDataError;
use crate::provider::coinranking::DEFAULT_BASE_URL;

/// How long a record stays fresh in the cache and in the store.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// Longest accepted TTL. Cache and store timestamps are chrono values, so the
/// TTL has to stay well inside their range.
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Everything the resolver needs besides its collaborators.
#[derive(Clone, Debug)]
pub struct MarketDataConfig {
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub api_base_url: String,
    pub api_key: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
        }
    }
}

impl MarketDataConfig {
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.cache_ttl.is_zero() {
            return Err(MarketDataError::Configuration(
                "cache TTL must be greater than zero".to_string(),
            ));
        }
        if self.cache_ttl > MAX_CACHE_TTL {
            return Err(MarketDataError::Configuration(format!(
                "cache TTL must not exceed {:?}",
                MAX_CACHE_TTL
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(MarketDataError::Configuration(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(MarketDataError::Configuration(
                "API base URL is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarketDataConfig::default();
        assert_eq!(config.cache_ttl, Duration::from_secs(10_800));
        assert_eq!(config.request_timeout, Duration::from_secs(8));
        assert_eq!(config.retry.max_retries, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = MarketDataConfig {
            cache_ttl: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MarketDataError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_huge_ttl() {
        let config = MarketDataConfig {
            cache_ttl: Duration::from_secs(u64::MAX),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MarketDataError::Configuration(_))
        ));

        let config = MarketDataConfig {
            cache_ttl: MAX_CACHE_TTL,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
