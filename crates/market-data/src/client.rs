//! Retrying client around a single [`MarketDataProvider`].
//!
//! Each call makes at most `max_retries + 1` attempts. Every attempt runs under
//! its own timeout, and every attempt after the first waits
//! `base_delay + uniform[0, max_jitter)` first. A 429 on the final attempt is
//! reported as [`MarketDataError::RateLimitExceeded`].

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use crate::errors::{MarketDataError, RetryClass};
use crate::models::{AssetId, MarketRecord};
use crate::provider::MarketDataProvider;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default fixed part of the delay before a retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default upper bound (exclusive) of the random part of the delay.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(1000);

/// Default timeout of a single attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// How many times to try and how long to wait in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_DELAY,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Retries without any delay.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait before the next retry.
    pub fn retry_delay(&self) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
        };
        self.base_delay + jitter
    }
}

/// Bounded-retry fetcher for market records.
pub struct MarketDataClient {
    provider: Arc<dyn MarketDataProvider>,
    policy: RetryPolicy,
    request_timeout: Duration,
}

impl MarketDataClient {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        policy: RetryPolicy,
        request_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            policy,
            request_timeout,
        }
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch one asset, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - `RateLimitExceeded` if the last attempt was rate limited
    /// - the first `Never`-class error, without further attempts
    /// - otherwise the error of the last attempt
    pub async fn fetch(&self, asset: AssetId) -> Result<MarketRecord, MarketDataError> {
        let provider_id = self.provider.id();
        let attempts = self.policy.total_attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.policy.retry_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            let result =
                match tokio::time::timeout(self.request_timeout, self.provider.fetch_record(asset))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(MarketDataError::Timeout {
                        provider: provider_id.to_string(),
                    }),
                };

            match result {
                Ok(record) => {
                    if attempt > 1 {
                        debug!("{} fetched {} on attempt {}", provider_id, asset, attempt);
                    }
                    return Ok(record);
                }
                Err(err) => {
                    warn!(
                        "{} attempt {}/{} for {} failed: {}",
                        provider_id, attempt, attempts, asset, err
                    );
                    if err.retry_class() == RetryClass::Never {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(MarketDataError::RateLimited { provider }) => {
                Err(MarketDataError::RateLimitExceeded { provider, attempts })
            }
            Some(err) => Err(err),
            None => Err(MarketDataError::Configuration(format!(
                "{} made no attempts for {}",
                provider_id, asset
            ))),
        }
    }
}
