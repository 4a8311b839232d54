//! SQLite storage implementation for the planets market data resolver.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the `MarketStore` trait defined in `planets-market-data` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - A single-writer actor for serialized writes
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! The resolver only sees the trait.
//!
//! ```text
//!     planets-market-data (MarketStore trait)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod market_data;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors
pub use errors::{StorageError, STORE_ID};

pub use market_data::SqliteMarketStore;
