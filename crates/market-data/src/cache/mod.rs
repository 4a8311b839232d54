//! Caching layer
//!
//! - `market_cache` - In-memory record cache with TTL and an owned sweep task
//! - `clock` - Time source abstraction so freshness can be tested deterministically

mod clock;
mod market_cache;

pub(crate) use clock::to_chrono;
pub use clock::{Clock, ManualClock, SystemClock};
pub use market_cache::{CacheEntry, MarketCache};
