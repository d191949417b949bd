use actix_web::{get, web, HttpResponse};
use tracing::warn;

use crate::{models::HealthResponse, services::SearchHistoryService};

#[get("/ping")]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("PONG")
}

#[get("/health")]
pub async fn health_check(service: web::Data<SearchHistoryService>) -> HttpResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    match service.ready().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "ok".to_string(),
            database: "ok".to_string(),
            timestamp,
        }),
        Err(e) => {
            warn!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "degraded".to_string(),
                database: "unavailable".to_string(),
                timestamp,
            })
        }
    }
}
