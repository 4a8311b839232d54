//! Storage-specific error types for SQLite operations.
//!
//! This module provides error types that wrap Diesel-specific errors and convert
//! them to the store error of `planets_market_data`.

use diesel::result::Error as DieselError;
use planets_market_data::MarketDataError;
use thiserror::Error;

/// Store id reported in converted errors and logs.
pub const STORE_ID: &str = "SQLITE";

/// Storage-specific errors that wrap Diesel and r2d2 types.
///
/// These errors are internal to the storage layer and are converted to
/// `MarketDataError::Store` before being returned through the `MarketStore` trait.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Writer actor stopped")]
    WriterStopped,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for MarketDataError {
    fn from(err: StorageError) -> Self {
        MarketDataError::store(STORE_ID, err)
    }
}
