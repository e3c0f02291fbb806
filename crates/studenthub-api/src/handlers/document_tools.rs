//! PDF tools: text extraction, page split, merge and compression

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::accepted;
use crate::state::AppState;
use crate::utils::upload::{extract_multipart_files, extract_multipart_upload, MultipartUpload};
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
};
use bytes::BytesMut;
use std::sync::Arc;
use studenthub_core::models::{PdfSplitParams, SessionTicketResponse};
use studenthub_core::AppError;
use studenthub_processing::{PageSelection, ToolJob};
use validator::Validate;

async fn submit_document(
    state: &AppState,
    upload: MultipartUpload,
    job: ToolJob,
) -> Result<impl IntoResponse, HttpAppError> {
    let extension = state.validators.document.validate_all(
        &upload.filename,
        &upload.content_type,
        &upload.data,
    )?;

    let ticket = state.jobs.submit(upload.data, &extension, job).await?;
    Ok(accepted(ticket))
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/pdf/to-text",
    tag = "pdf-tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field: `file` (PDF)"),
    responses(
        (status = 202, description = "Extraction accepted", body = SessionTicketResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Not a PDF", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "pdf_to_text"))]
pub async fn pdf_to_text(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = extract_multipart_upload(multipart).await?;
    submit_document(&state, upload, ToolJob::PdfToText).await
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/pdf/split",
    tag = "pdf-tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: `file` (PDF), `pages` (1-based ranges to keep, e.g. `1-3,5,8-`)"),
    responses(
        (status = 202, description = "Split accepted", body = SessionTicketResponse),
        (status = 400, description = "Invalid page selection", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Not a PDF", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "pdf_split"))]
pub async fn split_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = extract_multipart_upload(multipart).await?;

    let params = PdfSplitParams {
        pages: upload.required_field("pages")?,
    };
    params.validate()?;
    // Syntax errors are reported now; page bounds need the document
    PageSelection::parse(&params.pages)?;

    submit_document(&state, upload, ToolJob::SplitPdf { pages: params.pages }).await
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/pdf/compress",
    tag = "pdf-tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field: `file` (PDF)"),
    responses(
        (status = 202, description = "Compression accepted", body = SessionTicketResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Not a PDF", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "pdf_compress"))]
pub async fn compress_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = extract_multipart_upload(multipart).await?;
    submit_document(&state, upload, ToolJob::CompressPdf).await
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/pdf/merge",
    tag = "pdf-tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: `files` (PDF, repeated 2 or more times, merged in the order sent)"),
    responses(
        (status = 202, description = "Merge accepted", body = SessionTicketResponse),
        (status = 400, description = "Fewer than two or too many files", body = ErrorResponse),
        (status = 413, description = "Files too large", body = ErrorResponse),
        (status = 415, description = "Not a PDF", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "pdf_merge"))]
pub async fn merge_pdfs(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = extract_multipart_files(multipart, state.config.max_merge_files()).await?;

    if upload.files.len() < 2 {
        return Err(AppError::InvalidInput(
            "Send at least two PDFs as 'files' fields to merge".to_string(),
        )
        .into());
    }

    let total: usize = upload.files.iter().map(|f| f.data.len()).sum();
    let max = state.validators.document.max_file_size();
    if total > max {
        return Err(AppError::PayloadTooLarge(format!(
            "Files too large together: {} bytes (max: {} bytes)",
            total, max
        ))
        .into());
    }

    let mut input = BytesMut::with_capacity(total);
    let mut part_lengths = Vec::with_capacity(upload.files.len());
    for file in &upload.files {
        state
            .validators
            .document
            .validate_all(&file.filename, &file.content_type, &file.data)?;
        part_lengths.push(file.data.len());
        input.extend_from_slice(&file.data);
    }

    tracing::debug!(files = part_lengths.len(), total_bytes = total, "Merging uploaded PDFs");

    let ticket = state
        .jobs
        .submit(input.freeze(), "bin", ToolJob::MergePdf { part_lengths })
        .await?;
    Ok(accepted(ticket))
}
