use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::sessions::parse_session_id;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
};
use bytes::Bytes;
use futures::{stream, StreamExt};
use std::sync::Arc;
use studenthub_core::{AppError, ImageOutputFormat};

/// Content type served for a stored output extension
fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "txt" => "text/plain; charset=utf-8",
        other => ImageOutputFormat::parse(other)
            .map(|f| f.content_type())
            .unwrap_or("application/octet-stream"),
    }
}

/// Stream a session's output once.
///
/// The session is leased before the first byte is sent, so a second request
/// gets 404. The lease is released when the body has been fully written; a
/// body dropped early falls back to the store's release grace.
#[utoipa::path(
    get,
    path = "/api/v0/download/{id}",
    tag = "sessions",
    params(
        ("id" = String, Path, description = "Session ID returned when the job was accepted")
    ),
    responses(
        (status = 200, description = "Produced artifact", content_type = "application/octet-stream"),
        (status = 202, description = "Still processing", body = ErrorResponse),
        (status = 404, description = "Unknown or already downloaded", body = ErrorResponse),
        (status = 410, description = "Session expired", body = ErrorResponse),
        (status = 422, description = "Processing failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(session_id = %id, operation = "download_artifact"))]
pub async fn download_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response<Body>, HttpAppError> {
    let id = parse_session_id(&id)?;
    let lease = state.sessions.consume(&id).await?;

    let (length, file_stream) = match state.storage.open_stream(lease.output_path()).await {
        Ok(opened) => opened,
        Err(e) => {
            lease.release().await;
            return Err(e.into());
        }
    };

    let extension = lease
        .output_path()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_string();

    tracing::debug!(
        output = %lease.output_path().display(),
        length,
        "Streaming session output"
    );

    let body_stream = file_stream
        .map(|result| {
            result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
        })
        .chain(
            stream::once(async move { lease.release().await })
                .filter_map(|()| async { None::<Result<Bytes, std::io::Error>> }),
        );

    let content_disposition = format!("attachment; filename=\"studenthub-{}.{}\"", id, extension);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&extension))
        .header(header::CONTENT_LENGTH, length)
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
