//! Market data providers.
//!
//! - `traits` - The `MarketDataProvider` trait
//! - `coinranking` - Coinranking v2 coin endpoint

pub mod coinranking;
mod traits;

pub use coinranking::CoinrankingProvider;
pub use traits::MarketDataProvider;
