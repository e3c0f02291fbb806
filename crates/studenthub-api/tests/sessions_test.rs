//! Artifact session lifecycle over HTTP: polling, one-shot download and expiry.
//!
//! Run with: `cargo test -p studenthub-api --test sessions_test`

mod helpers;

use axum::http::StatusCode;
use bytes::Bytes;
use helpers::fixtures::create_test_png;
use helpers::workflows::{session_id, submit_file_tool, upload_form, wait_for_session};
use helpers::{api_path, setup_test_app, TestApp};
use serde_json::Value;
use std::future::IntoFuture;
use std::time::Duration;
use studenthub_services::ArtifactStorage;
use studenthub_storage::keys;

/// Submit a small convert job and wait until it is ready
async fn ready_session(app: &TestApp) -> String {
    let form = upload_form(
        create_test_png(8, 8),
        "icon.png",
        "image/png",
        &[("format", "bmp")],
    );
    let id = session_id(&submit_file_tool(app.client(), "image/convert", form).await);
    assert_eq!(wait_for_session(app.client(), &id).await["state"], "ready");
    id
}

#[tokio::test]
async fn test_second_download_is_not_found() {
    let app = setup_test_app().await;
    let client = app.client();
    let id = ready_session(&app).await;

    let first = client.get(&api_path(&format!("/download/{}", id))).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(first.headers()["cache-control"], "no-store");

    let second = client.get(&api_path(&format!("/download/{}", id))).await;
    assert_eq!(second.status_code(), StatusCode::NOT_FOUND);

    let status = client.get(&api_path(&format!("/sessions/{}", id))).await;
    assert_eq!(status.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_removes_files() {
    let app = setup_test_app().await;
    let id = ready_session(&app).await;
    assert_eq!(app.stored_files(), 2);

    let response = app
        .client()
        .get(&api_path(&format!("/download/{}", id)))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    assert_eq!(app.stored_files(), 0);
    assert_eq!(app.state.sessions.active_leases().await, 0);
}

#[tokio::test]
async fn test_concurrent_downloads_deliver_once() {
    let app = setup_test_app().await;
    let client = app.client();
    let id = ready_session(&app).await;

    let url = api_path(&format!("/download/{}", id));
    let (a, b) = tokio::join!(
        client.get(&url).into_future(),
        client.get(&url).into_future()
    );

    let mut statuses = vec![a.status_code().as_u16(), b.status_code().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![200, 404]);
}

#[tokio::test]
async fn test_expired_session() {
    let app = setup_test_app().await;
    let client = app.client();
    let id = ready_session(&app).await;

    app.clock.advance(Duration::from_secs(240));

    let status = client.get(&api_path(&format!("/sessions/{}", id))).await;
    assert_eq!(status.status_code(), StatusCode::GONE);
    assert_eq!(status.json::<Value>()["code"], "SESSION_EXPIRED");
    assert_eq!(app.stored_files(), 0);

    // The expired lookup evicted the session
    let again = client.get(&api_path(&format!("/download/{}", id))).await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_download_is_gone() {
    let app = setup_test_app().await;
    let id = ready_session(&app).await;

    app.clock.advance(Duration::from_secs(300));

    let response = app
        .client()
        .get(&api_path(&format!("/download/{}", id)))
        .await;
    assert_eq!(response.status_code(), StatusCode::GONE);
}

#[tokio::test]
async fn test_pending_session_download_is_accepted_not_served() {
    let app = setup_test_app().await;
    let input = app
        .state
        .storage
        .write(&keys::upload_key("png"), Bytes::from(create_test_png(2, 2)))
        .await
        .unwrap();
    let ticket = app
        .state
        .sessions
        .create(input, Duration::from_secs(240))
        .await
        .unwrap();

    let status = app
        .client()
        .get(&api_path(&format!("/sessions/{}", ticket.id)))
        .await;
    assert_eq!(status.status_code(), StatusCode::OK);
    let body = status.json::<Value>();
    assert_eq!(body["state"], "pending");
    assert_eq!(body["has_output"], false);

    let download = app
        .client()
        .get(&api_path(&format!("/download/{}", ticket.id)))
        .await;
    assert_eq!(download.status_code(), StatusCode::ACCEPTED);
    assert_eq!(download.json::<Value>()["code"], "NOT_READY");

    // Still downloadable later: a not-ready attempt does not consume the session
    assert_eq!(app.state.sessions.active_sessions().await, 1);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let app = setup_test_app().await;
    let client = app.client();

    let unknown = client
        .get(&api_path("/sessions/0123456789abcdef0123456789abcdef"))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let malformed = client.get(&api_path("/download/not-a-session")).await;
    assert_eq!(malformed.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ticket_shape() {
    let app = setup_test_app().await;
    let form = upload_form(
        create_test_png(8, 8),
        "icon.png",
        "image/png",
        &[("format", "webp")],
    );
    let ticket = submit_file_tool(app.client(), "image/convert", form).await;

    let id = session_id(&ticket);
    assert_eq!(id.len(), 32);
    assert_eq!(ticket["download_url"], api_path(&format!("/download/{}", id)));
    assert!(ticket["expires_at"].is_string());
}
