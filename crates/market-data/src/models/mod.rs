//! Market data models
//!
//! This module contains the core data types:
//! - `asset` - The fixed set of tracked assets (AssetId) and their provider ids
//! - `record` - MarketRecord handed to callers and its durable PersistentRecord form
//! - `numeric` - Serde helpers coercing string-or-number fields

mod asset;
pub(crate) mod numeric;
mod record;

pub use asset::AssetId;
pub use record::{MarketRecord, PersistentRecord};
