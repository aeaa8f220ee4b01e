//! POST /generate against a scripted provider.

mod common;

use article_service::services::providers::mock::MockTextProvider;
use article_service::services::providers::ProviderError;
use axum::http::StatusCode;
use common::{spawn_app, spawn_app_with_key};
use serde_json::json;

#[tokio::test]
async fn generates_keywords_then_article() {
    let app = spawn_app(
        MockTextProvider::new(true)
            .push_text("coffee shops brooklyn, best latte nyc\n")
            .push_text("<h1>Best Coffee in Brooklyn</h1><p>Latte time.</p>"),
    );

    let res = app
        .post_json(
            "/generate",
            json!({"title": "Best Coffee in Brooklyn", "city": "Brooklyn"}),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["title"], "Best Coffee in Brooklyn");
    assert_eq!(body["keywords"], "coffee shops brooklyn, best latte nyc");
    assert_eq!(
        body["article"],
        "<h1>Best Coffee in Brooklyn</h1><p>Latte time.</p>"
    );

    let calls = app.provider.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].prompt.contains("Brooklyn, USA"));
    assert!(calls[1].prompt.contains("coffee shops brooklyn, best latte nyc"));
}

#[tokio::test]
async fn missing_title_is_rejected_without_upstream_calls() {
    let app = spawn_app(MockTextProvider::new(true));

    let res = app.post_json("/generate", json!({"city": "Paris"})).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Title is required");
    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let app = spawn_app(MockTextProvider::new(true));

    let res = app.post_json("/generate", json!({"title": ""})).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = spawn_app(MockTextProvider::new(true));

    let res = app.post_raw("/generate", "{not json").await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Invalid JSON in request body");
    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn custom_keywords_skip_keyword_generation() {
    let app = spawn_app(MockTextProvider::new(true).push_text("<h1>Tacos</h1>"));

    let res = app
        .post_json(
            "/generate",
            json!({"title": "Tacos", "customKeywords": "tacos, street food"}),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["keywords"], "tacos, street food");
    assert_eq!(app.provider.call_count(), 1);
}

#[tokio::test]
async fn keyword_failure_aborts_before_article() {
    let app = spawn_app(
        MockTextProvider::new(true)
            .push_error(ProviderError::ApiError("quota exceeded".to_string())),
    );

    let res = app.post_json("/generate", json!({"title": "Tacos"})).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = res.json()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Failed to generate keywords:"), "{error}");
    assert!(error.contains("quota exceeded"));
    assert_eq!(app.provider.call_count(), 1);
}

#[tokio::test]
async fn article_failure_is_reported_with_stage() {
    let app = spawn_app(
        MockTextProvider::new(true)
            .push_text("tacos")
            .push_error(ProviderError::ContentFiltered("SAFETY".to_string())),
    );

    let res = app.post_json("/generate", json!({"title": "Tacos"})).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.json()["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to generate article:"));
    assert_eq!(app.provider.call_count(), 2);
}

#[tokio::test]
async fn missing_credential_is_a_configuration_error() {
    let app = spawn_app_with_key(MockTextProvider::new(true), None);

    let res = app.post_json("/generate", json!({"title": "Tacos"})).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.json()["error"],
        "API key is not configured. Please check your environment variables."
    );
    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn title_check_precedes_credential_check() {
    let app = spawn_app_with_key(MockTextProvider::new(true), None);

    let res = app.post_json("/generate", json!({})).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = spawn_app(MockTextProvider::new(true));

    let res = app.post_json("/generate", json!({})).await;

    assert!(res.headers.contains_key("x-request-id"));
    assert_eq!(res.headers["x-content-type-options"], "nosniff");
}
