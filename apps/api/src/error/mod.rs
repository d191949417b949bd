use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No authorization header provided")]
    MissingCredential,

    #[error("Invalid authorization format. Must be Bearer token")]
    MalformedCredential,

    #[error("Token has expired")]
    ExpiredCredential,

    #[error("Invalid token")]
    InvalidCredential,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Persisted store failure. `message` is what the caller sees; the
    /// source is only logged.
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn storage(message: &'static str, source: StoreError) -> Self {
        ApiError::Storage { message, source }
    }

    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::MissingCredential
                | ApiError::MalformedCredential
                | ApiError::ExpiredCredential
                | ApiError::InvalidCredential
        )
    }
}

/// Body shape shared by every failure response.
#[derive(Serialize)]
struct ErrorResponse<'a> {
    success: bool,
    message: &'a str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            err if err.is_credential_rejection() => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Config(_) | ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            message: &message,
        })
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
