use serde::{Deserialize, Serialize};

pub use search::{NewSearchRecord, SearchRecord, UserId};

mod search;

/// Body of `POST /search/save`.
///
/// Both fields are optional at the wire level so that missing fields reach
/// validation and produce a structured error instead of a bare parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSearchRequest {
    #[serde(default)]
    pub original_image: Option<String>,
    #[serde(default)]
    pub similar_images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<SearchRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub success: bool,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Health check response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
}
