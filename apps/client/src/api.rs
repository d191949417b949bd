use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, Result};

/// A past search as returned by `GET /search/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub original_image: String,
    #[serde(default)]
    pub similar_images: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /search/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSearch {
    pub original_image: String,
    pub similar_images: Vec<String>,
}

/// The search API as seen from the view. `authorization` is the full header value.
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn history(&self, authorization: &str) -> Result<Vec<HistoryEntry>>;
    async fn recommendations(&self, authorization: &str) -> Result<Vec<String>>;
    async fn save(&self, authorization: &str, search: &SaveSearch) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct HttpSearchApi {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HistoryData {
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsData {
    recommendations: Vec<String>,
}

impl HttpSearchApi {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, authorization: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("Authorization", authorization)
            .send()
            .await?;

        read_data(response).await
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn history(&self, authorization: &str) -> Result<Vec<HistoryEntry>> {
        let data: HistoryData = self.get("/search/history", authorization).await?;
        Ok(data.history)
    }

    async fn recommendations(&self, authorization: &str) -> Result<Vec<String>> {
        let data: RecommendationsData = self.get("/search/recommendations", authorization).await?;
        Ok(data.recommendations)
    }

    async fn save(&self, authorization: &str, search: &SaveSearch) -> Result<()> {
        let url = format!("{}/search/save", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .json(search)
            .send()
            .await?;

        read_success(response).await?;
        Ok(())
    }
}

/// Read a `{success, message, ...}` body, turning failure statuses and
/// `success: false` into [`ClientError::Rejected`].
async fn read_success(response: Response) -> Result<Value> {
    let status = response.status();
    let body = if status.is_success() {
        response.json::<Value>().await?
    } else {
        response.json::<Value>().await.unwrap_or(Value::Null)
    };

    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if status.is_success() && success {
        return Ok(body);
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default();

    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = read_success(response).await?;
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> Response {
        Response::from(
            http::Response::builder()
                .status(status)
                .header("Content-Type", "application/json")
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn forbidden_is_a_credential_rejection() {
        let err = read_success(response(
            403,
            r#"{"success":false,"message":"Token has expired"}"#,
        ))
        .await
        .unwrap_err();

        assert!(err.is_credential_rejection());
        assert_eq!(err.user_message(), "Token has expired");
    }

    #[tokio::test]
    async fn server_message_is_carried_through() {
        let err = read_success(response(
            500,
            r#"{"success":false,"message":"Error fetching search history"}"#,
        ))
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Rejected { status: 500, .. }));
        assert!(!err.is_credential_rejection());
        assert_eq!(err.user_message(), "Error fetching search history");
    }

    #[tokio::test]
    async fn non_json_failure_falls_back_to_generic_text() {
        let err = read_success(response(502, "<html>bad gateway</html>"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Rejected { status: 502, ref message } if message.is_empty()));
        assert_eq!(err.user_message(), "Error processing image");
    }

    #[tokio::test]
    async fn ok_status_with_success_false_is_rejected() {
        let err = read_success(response(200, r#"{"success":false}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Rejected { status: 200, .. }));
    }

    #[tokio::test]
    async fn history_body_is_decoded() {
        let data: HistoryData = read_data(response(
            200,
            r#"{"success":true,"history":[{"_id":"r1","userId":"u1","originalImage":"orig","similarImages":["a","b"],"timestamp":"2024-06-01T12:00:00Z"}]}"#,
        ))
        .await
        .unwrap();

        assert_eq!(data.history.len(), 1);
        assert_eq!(data.history[0].id, "r1");
        assert_eq!(data.history[0].similar_images, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn recommendations_body_is_decoded() {
        let data: RecommendationsData = read_data(response(
            200,
            r#"{"success":true,"recommendations":["x","y"]}"#,
        ))
        .await
        .unwrap();
        assert_eq!(data.recommendations, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let result: Result<RecommendationsData> =
            read_data(response(200, r#"{"success":true,"recommendations":"nope"}"#)).await;
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }
}
