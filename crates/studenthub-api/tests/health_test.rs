//! Health, docs and middleware integration tests.

mod helpers;

use axum::http::StatusCode;
use helpers::fixtures::create_test_png;
use helpers::workflows::{submit_file_tool, upload_form};
use helpers::setup_test_app;
use serde_json::Value;

#[tokio::test]
async fn test_health_reports_storage_and_sessions() {
    let app = setup_test_app().await;

    let form = upload_form(create_test_png(4, 4), "a.png", "image/png", &[("format", "gif")]);
    submit_file_tool(app.client(), "image/convert", form).await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "healthy");
    assert_eq!(body["active_sessions"], 1);
    assert_eq!(body["active_leases"], 0);
}

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app().await;
    let response = app.client().get("/health/live").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "alive");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let spec = response.json::<Value>();
    assert!(spec["paths"]["/api/v0/tools/pdf/split"].is_object());
    assert!(spec["paths"]["/api/v0/sessions/{id}"].is_object());
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/health/live")
        .add_header("x-request-id", "trace-me-123")
        .await;
    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");

    let generated = app.client().get("/health/live").await;
    assert!(!generated.headers()["x-request-id"].is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/v0/tools/image/rotate").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
