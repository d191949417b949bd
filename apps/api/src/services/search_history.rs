use std::{collections::HashSet, sync::Arc};

use tracing::{error, info};

use crate::{
    error::{ApiError, Result},
    models::{NewSearchRecord, SaveSearchRequest, SearchRecord, UserId},
    store::{HistoryStore, StoreError},
};

/// How many records the history tab shows.
pub const HISTORY_LIMIT: usize = 10;
/// How many recent records feed the recommendations.
pub const RECOMMENDATION_SOURCE_LIMIT: usize = 5;
/// Maximum number of recommended images returned.
pub const RECOMMENDATION_LIMIT: usize = 10;

#[derive(Clone)]
pub struct SearchHistoryService {
    store: Arc<dyn HistoryStore>,
}

impl SearchHistoryService {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// The caller's most recent searches, newest first.
    pub async fn history(&self, user: &UserId) -> Result<Vec<SearchRecord>> {
        self.store
            .recent(user, HISTORY_LIMIT)
            .await
            .map_err(|e| storage_failure("Error fetching search history", e))
    }

    /// Images drawn from the caller's last few searches, deduplicated.
    pub async fn recommendations(&self, user: &UserId) -> Result<Vec<String>> {
        let recent = self
            .store
            .recent(user, RECOMMENDATION_SOURCE_LIMIT)
            .await
            .map_err(|e| storage_failure("Error fetching recommendations", e))?;

        Ok(collect_recommendations(&recent, RECOMMENDATION_LIMIT))
    }

    /// Validate and persist a search for the caller.
    pub async fn save(&self, user: &UserId, request: SaveSearchRequest) -> Result<SearchRecord> {
        let record = validate_save_request(user, request)?;

        let saved = self
            .store
            .insert(record)
            .await
            .map_err(|e| storage_failure("Error saving search history", e))?;

        info!(
            user = %saved.user_id,
            record = %saved.id,
            similar = saved.similar_images.len(),
            "Saved search history"
        );
        Ok(saved)
    }

    pub async fn ready(&self) -> std::result::Result<(), StoreError> {
        self.store.ping().await
    }
}

fn storage_failure(message: &'static str, source: StoreError) -> ApiError {
    error!("{}: {}", message, source);
    ApiError::storage(message, source)
}

/// Union of the records' similar images in first-seen order, capped at `limit`.
///
/// Records are walked in the order given (newest first from the store) and
/// each record's images in their stored order.
pub fn collect_recommendations(records: &[SearchRecord], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|record| record.similar_images.iter().map(String::as_str))
        .filter(|image| seen.insert(*image))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Turn a save request into a record, rejecting it before any write when
/// required fields are missing or blank.
pub fn validate_save_request(user: &UserId, request: SaveSearchRequest) -> Result<NewSearchRecord> {
    let original_image = match request.original_image {
        Some(image) if !image.trim().is_empty() => image,
        _ => return Err(ApiError::Validation("originalImage is required".to_string())),
    };

    let similar_images = request
        .similar_images
        .ok_or_else(|| ApiError::Validation("similarImages is required".to_string()))?;

    if let Some(index) = similar_images.iter().position(|img| img.trim().is_empty()) {
        return Err(ApiError::Validation(format!(
            "similarImages[{}] must not be empty",
            index
        )));
    }

    Ok(NewSearchRecord {
        user_id: user.clone(),
        original_image,
        similar_images,
    })
}
