//! Planets Market Data Crate
//!
//! This crate resolves the live market figures shown next to each planet
//! (price, market cap, 24h volume, 24h change, rank) for a fixed set of
//! crypto assets.
//!
//! # Overview
//!
//! The market data crate supports:
//! - A TTL memory cache with an explicitly started and stopped sweep task
//! - An optional persistent store (Supabase here, SQLite in a sibling crate)
//! - A retrying API client with jittered delays and per-attempt timeouts
//! - A compiled-in fallback snapshot so tracked assets always render
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   identifier     |  ("ETH", " sol ", ...)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |    Resolver      | --> |   MarketCache    |  (TTL, sweeper)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |   MarketStore    |  (Supabase / SQLite, optional)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | MarketDataClient | --> |    Provider      |  (Coinranking)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  FallbackTable   |
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`AssetId`] - The tracked assets and their provider ids
//! - [`MarketRecord`] - The figures handed to callers
//! - [`PersistentRecord`] - A store row
//! - [`MarketDataResolver`] - Entry point; never fails, returns `Option`

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod store;

pub use cache::{Clock, ManualClock, MarketCache, SystemClock};
pub use client::{MarketDataClient, RetryPolicy};
pub use config::MarketDataConfig;
pub use errors::{MarketDataError, RetryClass};
pub use fallback::FallbackTable;
pub use models::{AssetId, MarketRecord, PersistentRecord};
pub use provider::{CoinrankingProvider, MarketDataProvider};
pub use resolver::{Lookup, MarketDataResolver, Resolution, ResolutionSource};
pub use store::{parse_timestamp, MarketStore, SupabaseStore};
