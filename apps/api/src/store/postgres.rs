use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{HistoryStore, StoreError};
use crate::models::{NewSearchRecord, SearchRecord, UserId};

#[derive(Debug, Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct SearchRecordRow {
    id: Uuid,
    user_id: String,
    original_image: String,
    similar_images: Vec<String>,
    #[sqlx(rename = "created_at")]
    timestamp: DateTime<Utc>,
}

impl From<SearchRecordRow> for SearchRecord {
    fn from(row: SearchRecordRow) -> Self {
        SearchRecord {
            id: row.id,
            user_id: UserId::new(row.user_id),
            original_image: row.original_image,
            similar_images: row.similar_images,
            timestamp: row.timestamp,
        }
    }
}

impl PgHistoryStore {
    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Search history schema is up to date");

        Ok(Self { pool })
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn insert(&self, record: NewSearchRecord) -> Result<SearchRecord, StoreError> {
        let record = record.into_record();

        sqlx::query(
            "INSERT INTO search_history (id, user_id, original_image, similar_images, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.id)
        .bind(record.user_id.as_str())
        .bind(&record.original_image)
        .bind(&record.similar_images)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn recent(&self, user: &UserId, limit: usize) -> Result<Vec<SearchRecord>, StoreError> {
        let rows: Vec<SearchRecordRow> = sqlx::query_as(
            "SELECT id, user_id, original_image, similar_images, created_at \
             FROM search_history \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, seq DESC \
             LIMIT $2",
        )
        .bind(user.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SearchRecord::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
