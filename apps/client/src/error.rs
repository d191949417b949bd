use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The search API answered with a failure status and `{success: false, message}`.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The similarity service could not produce results.
    #[error("Similarity service error: {}", .0.as_deref().unwrap_or("no details"))]
    Upstream(Option<String>),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// The API refused the credential (missing, malformed, expired or invalid).
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected { status: 403, .. })
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Upstream(Some(message)) => message.clone(),
            _ => "Error processing image".to_string(),
        }
    }
}
