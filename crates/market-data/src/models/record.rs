use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market data for one asset, as handed to the page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRecord {
    /// Unit price in USD
    pub price: f64,

    /// Total market capitalization
    pub market_cap: f64,

    /// Trailing 24-hour trade volume
    pub volume_24h: f64,

    /// Signed percentage change over 24 hours
    pub change_24h: f64,

    /// Market rank (1 = largest)
    pub rank: u32,
}

/// Durable counterpart of a [`MarketRecord`], keyed by asset identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct PersistentRecord {
    /// Lowercase asset identifier (the `planet` column)
    pub identifier: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub change_24h: f64,
    pub rank: u32,
    /// Last time the row was refreshed from the API
    pub updated_at: DateTime<Utc>,
    /// First insert time; `None` on rows built for an upsert
    pub created_at: Option<DateTime<Utc>>,
}

impl PersistentRecord {
    /// Builds the row to upsert after a successful API fetch.
    pub fn from_record(identifier: &str, record: &MarketRecord, updated_at: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.to_string(),
            price: record.price,
            market_cap: record.market_cap,
            volume_24h: record.volume_24h,
            change_24h: record.change_24h,
            rank: record.rank,
            updated_at,
            created_at: None,
        }
    }

    pub fn to_record(&self) -> MarketRecord {
        MarketRecord {
            price: self.price,
            market_cap: self.market_cap,
            volume_24h: self.volume_24h,
            change_24h: self.change_24h,
            rank: self.rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_camel_case() {
        let record = MarketRecord {
            price: 149.32,
            market_cap: 72_900_000_000.0,
            volume_24h: 2_870_000_000.0,
            change_24h: 1.25,
            rank: 6,
        };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["price"], 149.32);
        assert_eq!(json["marketCap"], 72_900_000_000.0);
        assert_eq!(json["volume24h"], 2_870_000_000.0);
        assert_eq!(json["change24h"], 1.25);
        assert_eq!(json["rank"], 6);
    }

    #[test]
    fn test_persistent_record_conversion() {
        let record = MarketRecord {
            price: 0.43,
            market_cap: 1_900_000_000.0,
            volume_24h: 143_990_000.0,
            change_24h: 0.66,
            rank: 59,
        };
        let now = Utc::now();
        let row = PersistentRecord::from_record("arb", &record, now);
        assert_eq!(row.identifier, "arb");
        assert_eq!(row.updated_at, now);
        assert!(row.created_at.is_none());
        assert_eq!(row.to_record(), record);
    }
}
