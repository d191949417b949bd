use actix_web::{error::JsonPayloadError, web};

use crate::error::ApiError;
use crate::handlers::{health_check, ping, search_config};

/// Configure all routes for the API
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(ping)
        .service(health_check)
        .configure(search_config);
}

/// JSON body settings: a large limit for base64 images, and body failures
/// reported in the same `{success, message}` shape as every other error.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| body_error(err).into())
}

fn body_error(err: JsonPayloadError) -> ApiError {
    match err {
        JsonPayloadError::OverflowKnownLength { length, limit } => ApiError::PayloadTooLarge(
            format!("Request body of {} bytes exceeds the {} byte limit", length, limit),
        ),
        JsonPayloadError::Overflow { limit } => {
            ApiError::PayloadTooLarge(format!("Request body exceeds the {} byte limit", limit))
        }
        other => ApiError::Validation(format!("Invalid request body: {}", other)),
    }
}
