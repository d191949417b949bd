use crate::{
    auth::AuthenticatedUser,
    error::ApiError,
    models::{HistoryResponse, MessageResponse, RecommendationsResponse, SaveSearchRequest},
    services::SearchHistoryService,
};
use actix_web::{get, post, web, HttpResponse};

#[get("/history")]
pub async fn get_search_history(
    AuthenticatedUser(user): AuthenticatedUser,
    service: web::Data<SearchHistoryService>,
) -> Result<HttpResponse, ApiError> {
    let history = service.history(&user).await?;

    Ok(HttpResponse::Ok().json(HistoryResponse {
        success: true,
        history,
    }))
}

#[get("/recommendations")]
pub async fn get_recommendations(
    AuthenticatedUser(user): AuthenticatedUser,
    service: web::Data<SearchHistoryService>,
) -> Result<HttpResponse, ApiError> {
    let recommendations = service.recommendations(&user).await?;

    Ok(HttpResponse::Ok().json(RecommendationsResponse {
        success: true,
        recommendations,
    }))
}

#[post("/save")]
pub async fn save_search(
    AuthenticatedUser(user): AuthenticatedUser,
    request: web::Json<SaveSearchRequest>,
    service: web::Data<SearchHistoryService>,
) -> Result<HttpResponse, ApiError> {
    service.save(&user, request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "Search history saved".to_string(),
    }))
}

pub fn search_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/search")
            .service(get_search_history)
            .service(get_recommendations)
            .service(save_search),
    );
}
