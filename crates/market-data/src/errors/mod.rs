//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining retry behavior
//!
//! None of these errors ever reach callers of
//! [`MarketDataResolver::resolve`](crate::resolver::MarketDataResolver::resolve);
//! the resolver converts every failure into the next fallback step.

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines how the retrying client should handle the error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The asset identifier is not part of the tracked set.
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// The provider rate limited a single attempt (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// Every attempt in the retry budget was rate limited.
    #[error("Rate limit exceeded after {attempts} attempts: {provider}")]
    RateLimitExceeded {
        /// The provider that kept rate limiting
        provider: String,
        /// Total attempts made
        attempts: u32,
    },

    /// A single attempt exceeded the per-request timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A network error occurred while communicating with a provider or store.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a non-success status other than 429.
    #[error("HTTP error from {provider}: status {status}")]
    HttpStatus {
        /// The provider that returned the status
        provider: String,
        /// The HTTP status code
        status: u16,
    },

    /// The provider answered 2xx but the body did not have the expected shape.
    #[error("Invalid response from {provider}: {message}")]
    BadResponse {
        /// The provider that returned the body
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The persistent store failed (unreachable, schema mismatch, bad row).
    #[error("Store error: {store} - {message}")]
    Store {
        /// The store implementation that failed
        store: String,
        /// The underlying error message
        message: String,
    },

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use planets_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "COINRANKING".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::UnknownAsset("xyz".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // The attempt is lost but the budget continues
            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::Network(_)
            | Self::HttpStatus { .. }
            | Self::BadResponse { .. } => RetryClass::WithBackoff,

            // Terminal errors - never retry
            Self::UnknownAsset(_)
            | Self::RateLimitExceeded { .. }
            | Self::Store { .. }
            | Self::Configuration(_) => RetryClass::Never,
        }
    }

    /// Shorthand for a [`Store`](Self::Store) error.
    pub fn store(store: &str, message: impl ToString) -> Self {
        Self::Store {
            store: store.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_asset_never_retries() {
        let error = MarketDataError::UnknownAsset("xyz".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = MarketDataError::RateLimited {
            provider: "COINRANKING".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = MarketDataError::Timeout {
            provider: "COINRANKING".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_http_status_retries_with_backoff() {
        let error = MarketDataError::HttpStatus {
            provider: "COINRANKING".to_string(),
            status: 500,
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_bad_response_retries_with_backoff() {
        let error = MarketDataError::BadResponse {
            provider: "COINRANKING".to_string(),
            message: "missing data.coin".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_exhaustion_and_store_errors_never_retry() {
        let error = MarketDataError::RateLimitExceeded {
            provider: "COINRANKING".to_string(),
            attempts: 3,
        };
        assert_eq!(error.retry_class(), RetryClass::Never);

        let error = MarketDataError::store("SQLITE", "disk I/O error");
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::UnknownAsset("xyz".to_string());
        assert_eq!(format!("{}", error), "Unknown asset: xyz");

        let error = MarketDataError::RateLimitExceeded {
            provider: "COINRANKING".to_string(),
            attempts: 3,
        };
        assert_eq!(
            format!("{}", error),
            "Rate limit exceeded after 3 attempts: COINRANKING"
        );

        let error = MarketDataError::HttpStatus {
            provider: "COINRANKING".to_string(),
            status: 503,
        };
        assert_eq!(
            format!("{}", error),
            "HTTP error from COINRANKING: status 503"
        );

        let error = MarketDataError::store("SUPABASE", "connection refused");
        assert_eq!(
            format!("{}", error),
            "Store error: SUPABASE - connection refused"
        );
    }
}
