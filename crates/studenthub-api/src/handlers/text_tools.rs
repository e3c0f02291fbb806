//! Text tools
//!
//! `to-pdf` produces a downloadable artifact like the file tools. The others
//! are pure functions of the request body and answer inline.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::accepted;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use bytes::Bytes;
use std::sync::Arc;
use studenthub_core::models::{
    SessionTicketResponse, SummarizeRequest, TextRequest, TextToPdfRequest,
};
use studenthub_core::{AppError, GrammarReport, Summary, TextStats};
use studenthub_processing::{text, ToolJob};
use validator::Validate;

fn check_text_length(state: &AppState, text: &str) -> Result<(), AppError> {
    let max = state.config.max_text_length();
    let length = text.chars().count();
    if length > max {
        return Err(AppError::PayloadTooLarge(format!(
            "Text is {} characters long (max: {})",
            length, max
        )));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/text/to-pdf",
    tag = "text-tools",
    request_body = TextToPdfRequest,
    responses(
        (status = 202, description = "Rendering accepted", body = SessionTicketResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 413, description = "Text too long", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "text_to_pdf"))]
pub async fn text_to_pdf(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<TextToPdfRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    check_text_length(&state, &request.text)?;

    let job = ToolJob::TextToPdf {
        title: request.title.filter(|t| !t.trim().is_empty()),
    };
    let ticket = state
        .jobs
        .submit(Bytes::from(request.text.into_bytes()), "txt", job)
        .await?;

    Ok(accepted(ticket))
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/text/stats",
    tag = "text-tools",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Text statistics", body = TextStats),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 413, description = "Text too long", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "text_stats"))]
pub async fn text_stats(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<TextRequest>,
) -> Result<Json<TextStats>, HttpAppError> {
    request.validate()?;
    check_text_length(&state, &request.text)?;

    Ok(Json(text::analyze(&request.text)))
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/text/grammar",
    tag = "text-tools",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Grammar issues found", body = GrammarReport),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 413, description = "Text too long", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "text_grammar"))]
pub async fn grammar_check(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<TextRequest>,
) -> Result<Json<GrammarReport>, HttpAppError> {
    request.validate()?;
    check_text_length(&state, &request.text)?;

    let report = text::check_grammar(&request.text);
    tracing::debug!(issue_count = report.issue_count, "Grammar check finished");
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/text/summarize",
    tag = "text-tools",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Extractive summary", body = Summary),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 413, description = "Text too long", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "text_summarize"))]
pub async fn summarize_text(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SummarizeRequest>,
) -> Result<Json<Summary>, HttpAppError> {
    request.validate()?;
    check_text_length(&state, &request.text)?;

    Ok(Json(text::summarize(&request.text, request.sentences)))
}
