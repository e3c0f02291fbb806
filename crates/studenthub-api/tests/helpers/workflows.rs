//! Workflow helpers for integration tests (submit → poll → download).

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use axum::http::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

use super::api_path;

/// Multipart form with a single `file` part plus text fields
pub fn upload_form(data: Vec<u8>, filename: &str, mime: &str, fields: &[(&str, &str)]) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name(filename.to_string())
        .mime_type(mime.to_string());
    fields
        .iter()
        .fold(MultipartForm::new().add_part("file", part), |form, (name, value)| {
            form.add_text(name.to_string(), value.to_string())
        })
}

/// Multipart form with one repeated `files` part per entry, in order
pub fn files_form(files: Vec<(Vec<u8>, &str, &str)>) -> MultipartForm {
    files
        .into_iter()
        .fold(MultipartForm::new(), |form, (data, filename, mime)| {
            let part = Part::bytes(bytes::Bytes::from(data))
                .file_name(filename.to_string())
                .mime_type(mime.to_string());
            form.add_part("files", part)
        })
}

/// Submit a multipart tool request and return the accepted ticket
pub async fn submit_file_tool(client: &TestServer, tool: &str, form: MultipartForm) -> Value {
    let response = client
        .post(&api_path(&format!("/tools/{}", tool)))
        .multipart(form)
        .await;
    assert_eq!(
        response.status_code(),
        StatusCode::ACCEPTED,
        "unexpected response: {}",
        response.text()
    );
    response.json::<Value>()
}

/// Poll the session until it leaves `pending` and return the final status body
pub async fn wait_for_session(client: &TestServer, session_id: &str) -> Value {
    for _ in 0..250 {
        let response = client
            .get(&api_path(&format!("/sessions/{}", session_id)))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let status = response.json::<Value>();
        if status["state"] != "pending" {
            return status;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("session {} stayed pending", session_id);
}

pub fn session_id(ticket: &Value) -> String {
    ticket["session_id"]
        .as_str()
        .expect("Expected 'session_id' in ticket")
        .to_string()
}
