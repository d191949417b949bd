use std::sync::Arc;

use actix_web::{dev::ServiceResponse, http::StatusCode, test, web, App};
use chrono::Duration;
use fashion_finder_api::{
    auth::TokenVerifier,
    models::UserId,
    routes::{api_routes, json_config},
    services::SearchHistoryService,
    store::MemoryHistoryStore,
};
use serde_json::{json, Value};

const SECRET: &str = "integration-secret";

struct Harness {
    verifier: TokenVerifier,
    store: Arc<MemoryHistoryStore>,
}

impl Harness {
    fn new() -> Self {
        Self {
            verifier: TokenVerifier::new(SECRET),
            store: Arc::new(MemoryHistoryStore::new()),
        }
    }

    fn bearer(&self, user: &str) -> String {
        let token = self
            .verifier
            .issue(&UserId::new(user), None, Duration::hours(1))
            .unwrap();
        format!("Bearer {}", token)
    }
}

/// Route table under test, backed by the harness's in-memory store.
macro_rules! init_app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data(json_config(1024 * 1024))
                .app_data(web::Data::new($harness.verifier.clone()))
                .app_data(web::Data::new(SearchHistoryService::new(
                    $harness.store.clone(),
                )))
                .configure(api_routes),
        )
        .await
    };
}

async fn json_body(response: ServiceResponse) -> Value {
    test::read_body_json(response).await
}

fn save_request(auth: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/search/save")
        .insert_header(("Authorization", auth))
        .set_json(body)
}

#[actix_web::test]
async fn ping_needs_no_credential() {
    let harness = Harness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::get().uri("/ping").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, web::Bytes::from_static(b"PONG"));
}

#[actix_web::test]
async fn health_reports_store_status() {
    let harness = Harness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::get().uri("/health").to_request();
    let response = test::call_service(&app, req).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["database"], "ok");
}

#[actix_web::test]
async fn missing_header_is_rejected_for_every_search_route() {
    let harness = Harness::new();
    let app = init_app!(harness);

    let requests = vec![
        test::TestRequest::get().uri("/search/history").to_request(),
        test::TestRequest::get().uri("/search/recommendations").to_request(),
        test::TestRequest::post()
            .uri("/search/save")
            .set_json(json!({"originalImage": "o", "similarImages": ["a"]}))
            .to_request(),
    ];

    for req in requests {
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "No authorization header provided");
    }

    // Rejected save never reached the store.
    assert!(harness.store.is_empty().await);
}

#[actix_web::test]
async fn malformed_header_is_rejected() {
    let harness = Harness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::get()
        .uri("/search/history")
        .insert_header(("Authorization", "Token abc"))
        .to_request();
    let response = test::call_service(&app, req).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(
        body["message"],
        "Invalid authorization format. Must be Bearer token"
    );
}

#[actix_web::test]
async fn expired_and_invalid_tokens_have_distinct_messages() {
    let harness = Harness::new();
    let app = init_app!(harness);

    let expired = harness
        .verifier
        .issue(&UserId::new("u1"), None, Duration::hours(-2))
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/search/history")
        .insert_header(("Authorization", format!("Bearer {}", expired)))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["message"], "Token has expired");

    let forged = TokenVerifier::new("not-the-secret")
        .issue(&UserId::new("u1"), None, Duration::hours(1))
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/search/history")
        .insert_header(("Authorization", format!("Bearer {}", forged)))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["message"], "Invalid token");
}

#[actix_web::test]
async fn saved_search_is_newest_in_history() {
    let harness = Harness::new();
    let app = init_app!(harness);
    let auth = harness.bearer("alice");

    for (original, similar) in [("first", vec!["a", "b"]), ("second", vec!["c"])] {
        let req = save_request(
            &auth,
            json!({"originalImage": original, "similarImages": similar}),
        )
        .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Search history saved");
    }

    let req = test::TestRequest::get()
        .uri("/search/history")
        .insert_header(("Authorization", auth.as_str()))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;

    assert_eq!(body["success"], true);
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["originalImage"], "second");
    assert_eq!(history[0]["userId"], "alice");
    assert_eq!(history[1]["similarImages"], json!(["a", "b"]));
    assert!(history[0]["_id"].is_string());
    assert!(history[0]["timestamp"].is_string());
}

#[actix_web::test]
async fn history_is_limited_to_ten() {
    let harness = Harness::new();
    let app = init_app!(harness);
    let auth = harness.bearer("alice");

    for i in 0..12 {
        let req = save_request(
            &auth,
            json!({"originalImage": format!("img{}", i), "similarImages": []}),
        )
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/search/history")
        .insert_header(("Authorization", auth.as_str()))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0]["originalImage"], "img11");
}

#[actix_web::test]
async fn history_never_leaks_other_users_records() {
    let harness = Harness::new();
    let app = init_app!(harness);
    let alice = harness.bearer("alice");
    let bob = harness.bearer("bob");

    let req = save_request(
        &alice,
        json!({"originalImage": "alice-img", "similarImages": ["x"]}),
    )
    .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/search/history")
        .insert_header(("Authorization", bob.as_str()))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["history"], json!([]));

    let req = test::TestRequest::get()
        .uri("/search/recommendations")
        .insert_header(("Authorization", bob.as_str()))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["recommendations"], json!([]));
}

#[actix_web::test]
async fn recommendations_without_history_are_empty() {
    let harness = Harness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::get()
        .uri("/search/recommendations")
        .insert_header(("Authorization", harness.bearer("newcomer")))
        .to_request();
    let response = test::call_service(&app, req).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, json!({"success": true, "recommendations": []}));
}

#[actix_web::test]
async fn recommendations_dedupe_across_records() {
    let harness = Harness::new();
    let app = init_app!(harness);
    let auth = harness.bearer("alice");

    for similar in [vec!["shared", "one"], vec!["two", "shared"]] {
        let req = save_request(&auth, json!({"originalImage": "o", "similarImages": similar}))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri("/search/recommendations")
        .insert_header(("Authorization", auth.as_str()))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["recommendations"], json!(["two", "shared", "one"]));
}

#[actix_web::test]
async fn save_without_original_image_persists_nothing() {
    let harness = Harness::new();
    let app = init_app!(harness);

    let req = save_request(&harness.bearer("alice"), json!({"similarImages": ["a"]})).to_request();
    let response = test::call_service(&app, req).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "originalImage is required");

    assert!(harness.store.is_empty().await);
}

#[actix_web::test]
async fn unparseable_body_gets_structured_error() {
    let harness = Harness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::post()
        .uri("/search/save")
        .insert_header(("Authorization", harness.bearer("alice")))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = test::call_service(&app, req).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn oversized_body_is_payload_too_large() {
    let harness = Harness::new();
    let app = init_app!(harness);

    let image = "A".repeat(2 * 1024 * 1024);
    let req = save_request(
        &harness.bearer("alice"),
        json!({"originalImage": image, "similarImages": []}),
    )
    .to_request();
    let response = test::call_service(&app, req).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("limit"));

    assert!(harness.store.is_empty().await);
}
