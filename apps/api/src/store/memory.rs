use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{HistoryStore, StoreError};
use crate::models::{NewSearchRecord, SearchRecord, UserId};

/// In-process store selected with `DATABASE_URL=memory://`. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<SearchRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn insert(&self, record: NewSearchRecord) -> Result<SearchRecord, StoreError> {
        let record = record.into_record();
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn recent(&self, user: &UserId, limit: usize) -> Result<Vec<SearchRecord>, StoreError> {
        let records = self.records.read().await;

        // Reverse first so the stable sort leaves later inserts ahead on equal timestamps.
        let mut owned: Vec<SearchRecord> = records
            .iter()
            .rev()
            .filter(|record| &record.user_id == user)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        owned.truncate(limit);

        Ok(owned)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
