//! Cache-first resolution of market records.
//!
//! # Architecture
//!
//! Each lookup walks down the layers until one of them produces a record:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MarketDataResolver                        │
//! │                                                              │
//! │  1. Memory cache      fresh entry (age < TTL)?        ──hit──┼──▶ record
//! │           │ miss                                             │
//! │  2. Store             row with updated_at within TTL? ──hit──┼──▶ record
//! │           │ miss / error                                     │
//! │  3. API (retrying)    success?                        ──ok───┼──▶ record
//! │           │ exhausted                         (cache + async upsert)
//! │  4. Fallback table    entry for identifier?           ──hit──┼──▶ record
//! │           │ miss                           (cache, backdated TTL/2)
//! │           ▼                                                  │
//! │         None                                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers outside the tracked set skip layers 1-3 and are never cached.
//! Concurrent misses for the same identifier share a single walk of layers 2-4.

mod lookup;
mod market_resolver;

pub use lookup::{Lookup, Resolution, ResolutionSource};
pub use market_resolver::MarketDataResolver;
