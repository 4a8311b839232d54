//! Persisted market records (the `crypto_data` table).

mod model;
mod repository;

pub use model::{CryptoDataDB, NewCryptoDataDB};
pub use repository::SqliteMarketStore;
