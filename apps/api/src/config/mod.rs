use crate::error::{ApiError, Result};
use serde::Deserialize;

const DEFAULT_JSON_LIMIT: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Request body limit in bytes. Images travel base64-encoded, so this is large.
    pub json_limit: usize,
}

/// Which history backend `DATABASE_URL` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres(String),
    Memory,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_source(config::Environment::default().try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: Config = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8082)?
            .set_default("database_max_connections", 5)?
            .set_default("json_limit", DEFAULT_JSON_LIMIT as i64)?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ApiError::Config("JWT_SECRET must not be empty".to_string()));
        }
        if self.database_url.trim().is_empty() {
            return Err(ApiError::Config("DATABASE_URL must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn store_backend(&self) -> StoreBackend {
        if self.database_url.starts_with("memory:") {
            StoreBackend::Memory
        } else {
            StoreBackend::Postgres(self.database_url.clone())
        }
    }
}
