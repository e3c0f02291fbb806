//! Text tool integration tests.
//!
//! Run with: `cargo test -p studenthub-api --test text_tools_test`

mod helpers;

use axum::http::StatusCode;
use helpers::workflows::{session_id, wait_for_session};
use helpers::{api_path, setup_test_app, setup_test_app_with};
use serde_json::{json, Value};

#[tokio::test]
async fn test_stats() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post(&api_path("/tools/text/stats"))
        .json(&json!({ "text": "The cat sat. The cat ran!\n\nA new paragraph here." }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let stats = response.json::<Value>();
    assert_eq!(stats["words"], 10);
    assert_eq!(stats["unique_words"], 8);
    assert_eq!(stats["sentences"], 3);
    assert_eq!(stats["paragraphs"], 2);
    assert_eq!(stats["reading_time_minutes"], 1);
}

#[tokio::test]
async fn test_grammar_reports_issues() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post(&api_path("/tools/text/grammar"))
        .json(&json!({ "text": "I went to the the store." }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let report = response.json::<Value>();
    assert_eq!(report["issue_count"], 1);
    assert_eq!(report["issues"][0]["kind"], "repeated_word");
    assert_eq!(report["issues"][0]["offset"], 10);
}

#[tokio::test]
async fn test_summarize() {
    let app = setup_test_app().await;
    let text = "Photosynthesis converts light into energy. \
                The weather was nice yesterday. \
                Plants use photosynthesis to make energy from light. \
                My cousin likes football.";
    let response = app
        .client()
        .post(&api_path("/tools/text/summarize"))
        .json(&json!({ "text": text, "sentences": 2 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let summary = response.json::<Value>();
    assert_eq!(summary["sentence_indices"], json!([0, 2]));
    assert_eq!(summary["original_sentences"], 4);
}

#[tokio::test]
async fn test_summarize_rejects_out_of_range_sentence_count() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post(&api_path("/tools/text/summarize"))
        .json(&json!({ "text": "One. Two.", "sentences": 0 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post(&api_path("/tools/text/stats"))
        .json(&json!({ "text": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_uses_error_format() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post(&api_path("/tools/text/grammar"))
        .json(&json!({ "body": "wrong field" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_text_over_limit_is_rejected() {
    let app = setup_test_app_with(&[("MAX_TEXT_LENGTH", "10")]).await;
    let response = app
        .client()
        .post(&api_path("/tools/text/stats"))
        .json(&json!({ "text": "This text is longer than ten characters." }))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_text_to_pdf_workflow() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post(&api_path("/tools/text/to-pdf"))
        .json(&json!({ "title": "Biology", "text": "Mitochondria make energy." }))
        .await;
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    let id = session_id(&response.json::<Value>());

    assert_eq!(wait_for_session(client, &id).await["state"], "ready");

    let download = client.get(&api_path(&format!("/download/{}", id))).await;
    assert_eq!(download.status_code(), StatusCode::OK);
    assert_eq!(download.headers()["content-type"], "application/pdf");
    assert!(download.as_bytes().starts_with(b"%PDF-"));
}
