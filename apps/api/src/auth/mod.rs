//! Bearer-token verification for the search endpoints.
//!
//! Tokens are HS256 JWTs signed with the process-wide `JWT_SECRET`. A request
//! is rejected before its handler runs when the `Authorization` header is
//! missing, is not `Bearer <token>`, or carries a token that is expired or
//! fails verification. Expiry is reported separately from every other
//! verification failure so clients can tell "log in again" from "bad token".

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::models::UserId;

const SCHEME_PREFIX: &str = "Bearer ";

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id. Issuers that emit `_id` are accepted too.
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiry (unix timestamp).
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

#[derive(Clone)]
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Check a raw `Authorization` header value and return the caller's identity.
    pub fn verify(&self, header: Option<&str>) -> Result<UserId> {
        let header = header.ok_or(ApiError::MissingCredential)?;
        let token = header
            .strip_prefix(SCHEME_PREFIX)
            .ok_or(ApiError::MalformedCredential)?;
        let token = token.split(' ').next().unwrap_or_default();

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => ApiError::ExpiredCredential,
                _ => ApiError::InvalidCredential,
            }
        })?;

        if data.claims.id.is_empty() {
            return Err(ApiError::InvalidCredential);
        }

        Ok(UserId::new(data.claims.id))
    }

    /// Sign a token for `user` that expires after `ttl`. A negative `ttl`
    /// produces an already-expired token.
    pub fn issue(&self, user: &UserId, email: Option<&str>, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| ApiError::Config("Token lifetime is out of range".to_string()))?;

        let claims = Claims {
            id: user.as_str().to_string(),
            email: email.map(str::to_string),
            exp: expires.timestamp(),
            iat: Some(now.timestamp()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {}", e)))
    }
}

/// The verified identity of the caller, extracted from the `Authorization` header.
///
/// Handlers taking this as an argument are never invoked for rejected requests.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    fn from_http(req: &HttpRequest) -> Result<Self> {
        let verifier = req
            .app_data::<web::Data<TokenVerifier>>()
            .ok_or_else(|| ApiError::Internal("Token verifier is not configured".to_string()))?;

        let header = match req.headers().get(header::AUTHORIZATION) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| ApiError::MalformedCredential)?),
        };

        verifier.verify(header).map(AuthenticatedUser).map_err(|err| {
            debug!(path = %req.path(), reason = %err, "Rejected credential");
            err
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_http(req))
    }
}
