use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use studenthub_core::models::SessionStatusResponse;
use studenthub_core::{AppError, SessionId};

/// Parse a session id from the path. Malformed ids cannot name a session.
pub(crate) fn parse_session_id(raw: &str) -> Result<SessionId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Session not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v0/sessions/{id}",
    tag = "sessions",
    params(
        ("id" = String, Path, description = "Session ID returned when the job was accepted")
    ),
    responses(
        (status = 200, description = "Session state", body = SessionStatusResponse),
        (status = 404, description = "Unknown or already downloaded", body = ErrorResponse),
        (status = 410, description = "Session expired", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(session_id = %id, operation = "session_status"))]
pub async fn get_session_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, HttpAppError> {
    let id = parse_session_id(&id)?;
    let session = state.sessions.get(&id).await?;

    Ok(Json(SessionStatusResponse::from_session(
        &session,
        state.sessions.now(),
    )))
}
