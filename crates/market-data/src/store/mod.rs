//! Persistent store layer
//!
//! - `traits` - The `MarketStore` trait implemented by every backend
//! - `supabase` - PostgREST-backed store for a hosted `crypto_data` table
//!
//! A SQLite implementation lives in the `planets-storage-sqlite` crate.

mod supabase;
mod traits;

pub use supabase::SupabaseStore;
pub use traits::MarketStore;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parses a stored timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00.5+00:00`) and, for columns without a
/// zone, naive ISO timestamps which are taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
