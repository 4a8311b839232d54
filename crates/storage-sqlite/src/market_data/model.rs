//! Database models for persisted market records.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use planets_market_data::{parse_timestamp, PersistentRecord};

use crate::errors::StorageError;

/// Database model for a `crypto_data` row
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::crypto_data)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CryptoDataDB {
    pub id: i32,
    pub planet: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub change_24h: f64,
    pub rank: i32,
    pub updated_at: String,
    pub created_at: String,
}

/// Insertable form; `id` is assigned by SQLite.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::crypto_data)]
pub struct NewCryptoDataDB {
    pub planet: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub change_24h: f64,
    pub rank: i32,
    pub updated_at: String,
    pub created_at: String,
}

pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl TryFrom<&PersistentRecord> for NewCryptoDataDB {
    type Error = StorageError;

    fn try_from(record: &PersistentRecord) -> Result<Self, Self::Error> {
        let rank = i32::try_from(record.rank).map_err(|_| {
            StorageError::InvalidRow(format!("rank {} out of range", record.rank))
        })?;
        let updated_at = format_timestamp(record.updated_at);

        Ok(Self {
            planet: record.identifier.clone(),
            price: record.price,
            market_cap: record.market_cap,
            volume_24h: record.volume_24h,
            change_24h: record.change_24h,
            rank,
            created_at: record
                .created_at
                .map(format_timestamp)
                .unwrap_or_else(|| updated_at.clone()),
            updated_at,
        })
    }
}

impl TryFrom<CryptoDataDB> for PersistentRecord {
    type Error = StorageError;

    fn try_from(row: CryptoDataDB) -> Result<Self, Self::Error> {
        let rank = u32::try_from(row.rank)
            .map_err(|_| StorageError::InvalidRow(format!("negative rank for {}", row.planet)))?;
        let updated_at = parse_timestamp(&row.updated_at).ok_or_else(|| {
            StorageError::InvalidRow(format!(
                "invalid updated_at for {}: {:?}",
                row.planet, row.updated_at
            ))
        })?;

        Ok(PersistentRecord {
            rank,
            updated_at,
            created_at: parse_timestamp(&row.created_at),
            price: row.price,
            market_cap: row.market_cap,
            volume_24h: row.volume_24h,
            change_24h: row.change_24h,
            identifier: row.planet,
        })
    }
}
