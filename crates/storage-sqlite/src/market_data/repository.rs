//! SQLite implementation of `MarketStore`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use std::sync::Arc;

use planets_market_data::{MarketDataError, MarketStore, PersistentRecord};

use super::model::{CryptoDataDB, NewCryptoDataDB};
use crate::db::{self, get_connection, DbPool, WriteHandle};
use crate::errors::{StorageError, STORE_ID};
use crate::schema::crypto_data;
use crate::schema::crypto_data::dsl::*;

pub struct SqliteMarketStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteMarketStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Creates the file if needed, migrates it and starts the writer actor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(db_path: &str) -> Result<Self, StorageError> {
        db::init(db_path)?;
        let pool = db::create_pool(db_path)?;
        db::run_migrations(&pool)?;
        let writer = db::spawn_writer(&pool)?;
        Ok(Self::new(pool, writer))
    }

    fn get_impl(&self, identifier: &str) -> Result<Option<PersistentRecord>, StorageError> {
        let mut conn = get_connection(&self.pool)?;
        let row = crypto_data
            .filter(planet.eq(identifier))
            .select(CryptoDataDB::as_select())
            .first::<CryptoDataDB>(&mut conn)
            .optional()?;

        row.map(PersistentRecord::try_from).transpose()
    }
}

#[async_trait]
impl MarketStore for SqliteMarketStore {
    fn id(&self) -> &'static str {
        STORE_ID
    }

    async fn get(&self, identifier: &str) -> Result<Option<PersistentRecord>, MarketDataError> {
        Ok(self.get_impl(identifier)?)
    }

    async fn upsert(&self, record: &PersistentRecord) -> Result<(), MarketDataError> {
        let new_row = NewCryptoDataDB::try_from(record)?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<(), StorageError> {
                // created_at is only written on first insert.
                diesel::insert_into(crypto_data::table)
                    .values(&new_row)
                    .on_conflict(planet)
                    .do_update()
                    .set((
                        price.eq(excluded(price)),
                        market_cap.eq(excluded(market_cap)),
                        volume_24h.eq(excluded(volume_24h)),
                        change_24h.eq(excluded(change_24h)),
                        rank.eq(excluded(rank)),
                        updated_at.eq(excluded(updated_at)),
                    ))
                    .execute(conn)?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}
