//! Persistence for search records.
//!
//! Records are append-only: the API creates them on save and reads them back
//! filtered by owner. Nothing here updates or deletes.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewSearchRecord, SearchRecord, UserId};

pub mod memory;
pub mod postgres;

pub use memory::MemoryHistoryStore;
pub use postgres::PgHistoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist a record. Either the whole record is stored or nothing is.
    async fn insert(&self, record: NewSearchRecord) -> Result<SearchRecord, StoreError>;

    /// The `limit` most recent records owned by `user`, newest first.
    ///
    /// Records with equal timestamps come back in reverse insertion order.
    async fn recent(&self, user: &UserId, limit: usize) -> Result<Vec<SearchRecord>, StoreError>;

    /// Cheap liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
