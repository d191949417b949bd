use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identity of the user owning a record, taken from the token's `id` claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One persisted search: the uploaded image and what the similarity service returned for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: UserId,
    pub original_image: String,
    pub similar_images: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// A validated record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSearchRecord {
    pub user_id: UserId,
    pub original_image: String,
    pub similar_images: Vec<String>,
}

impl NewSearchRecord {
    /// Stamp the record with an id and the creation time.
    pub fn into_record(self) -> SearchRecord {
        SearchRecord {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            original_image: self.original_image,
            similar_images: self.similar_images,
            timestamp: Utc::now(),
        }
    }
}
