use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::image::ImageFile;

/// What the similarity service returns for one uploaded image.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimilarityResult {
    #[serde(default)]
    pub original_image: Option<String>,
    /// `None` when the service answered without a result list.
    #[serde(default)]
    pub similar_images: Option<Vec<String>>,
}

#[async_trait]
pub trait SimilarityService: Send + Sync {
    async fn find_similar(&self, image: &ImageFile) -> Result<SimilarityResult>;
}

/// Client for the external `POST /find-similar` endpoint.
#[derive(Debug, Clone)]
pub struct HttpSimilarityService {
    client: Client,
    base_url: String,
}

impl HttpSimilarityService {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SimilarityService for HttpSimilarityService {
    async fn find_similar(&self, image: &ImageFile) -> Result<SimilarityResult> {
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.media_type)?;
        let form = multipart::Form::new().part("image", part);

        let url = format!("{}/find-similar", self.base_url);
        debug!(file = %image.name, bytes = image.bytes.len(), "Submitting image for similarity search");

        let response = self.client.post(&url).multipart(form).send().await?;
        read_similarity(response).await
    }
}

/// Failure statuses become [`ClientError::Upstream`] carrying the body's
/// `error` text when there is one.
async fn read_similarity(response: Response) -> Result<SimilarityResult> {
    let status = response.status();

    if !status.is_success() {
        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string));
        debug!(%status, ?detail, "Similarity service rejected the image");
        return Err(ClientError::Upstream(detail));
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> Response {
        Response::from(http::Response::builder().status(status).body(body).unwrap())
    }

    #[tokio::test]
    async fn error_text_is_kept() {
        let err = read_similarity(response(404, r#"{"error":"No similar images found"}"#))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Upstream(Some(ref m)) if m == "No similar images found"));
        assert_eq!(err.user_message(), "No similar images found");
    }

    #[tokio::test]
    async fn failure_without_json_has_no_detail() {
        let err = read_similarity(response(500, "<html>internal error</html>"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Upstream(None)));
        assert_eq!(err.user_message(), "Error processing image");
    }

    #[tokio::test]
    async fn original_image_is_optional() {
        let result = read_similarity(response(200, r#"{"similar_images":["a","b"]}"#))
            .await
            .unwrap();

        assert_eq!(result.original_image, None);
        assert_eq!(result.similar_images, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[tokio::test]
    async fn missing_result_list_is_none() {
        let result = read_similarity(response(200, "{}")).await.unwrap();
        assert_eq!(result, SimilarityResult::default());
        assert!(result.similar_images.is_none());
    }

    #[tokio::test]
    async fn full_result_is_decoded() {
        let result = read_similarity(response(
            200,
            r#"{"original_image":"b64","similar_images":[]}"#,
        ))
        .await
        .unwrap();

        assert_eq!(result.original_image.as_deref(), Some("b64"));
        assert_eq!(result.similar_images, Some(vec![]));
    }
}
