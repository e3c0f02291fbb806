//! Image tools: resize, compress and convert

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::accepted;
use crate::state::AppState;
use crate::utils::upload::{extract_multipart_upload, MultipartUpload};
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
};
use std::sync::Arc;
use studenthub_core::models::{
    ImageCompressParams, ImageOutputFormat, ImageResizeParams, SessionTicketResponse,
};
use studenthub_core::AppError;
use studenthub_processing::ToolJob;
use validator::Validate;

/// Validate the uploaded image and start `job` against it
async fn submit_image(
    state: &AppState,
    upload: MultipartUpload,
    job: ToolJob,
) -> Result<impl IntoResponse, HttpAppError> {
    let extension = state.validators.image.validate_all(
        &upload.filename,
        &upload.content_type,
        &upload.data,
    )?;

    let ticket = state.jobs.submit(upload.data, &extension, job).await?;
    Ok(accepted(ticket))
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/image/resize",
    tag = "image-tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: `file`, `width`, `height`, optional `keep_aspect` (default true)"),
    responses(
        (status = 202, description = "Resize accepted", body = SessionTicketResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "image_resize"))]
pub async fn resize_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = extract_multipart_upload(multipart).await?;

    let params = ImageResizeParams {
        width: upload.required_field("width")?,
        height: upload.required_field("height")?,
        keep_aspect: upload.bool_field("keep_aspect")?.unwrap_or(true),
    };
    params.validate()?;

    let job = ToolJob::ResizeImage {
        width: params.width,
        height: params.height,
        keep_aspect: params.keep_aspect,
    };
    submit_image(&state, upload, job).await
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/image/compress",
    tag = "image-tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: `file`, optional `quality` 1-100 (default 75)"),
    responses(
        (status = 202, description = "Compression accepted", body = SessionTicketResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "image_compress"))]
pub async fn compress_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = extract_multipart_upload(multipart).await?;

    let mut params = ImageCompressParams::default();
    if let Some(quality) = upload.field::<u8>("quality")? {
        params.quality = quality;
    }
    params.validate()?;

    let job = ToolJob::CompressImage {
        quality: params.quality,
    };
    submit_image(&state, upload, job).await
}

#[utoipa::path(
    post,
    path = "/api/v0/tools/image/convert",
    tag = "image-tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: `file`, `format` (jpeg, png, webp, gif or bmp)"),
    responses(
        (status = 202, description = "Conversion accepted", body = SessionTicketResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "image_convert"))]
pub async fn convert_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = extract_multipart_upload(multipart).await?;

    let raw: String = upload.required_field("format")?;
    let format = ImageOutputFormat::parse(&raw).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Unsupported target format '{}'. Use jpeg, png, webp, gif or bmp",
            raw
        ))
    })?;
    let job = ToolJob::ConvertImage { format };
    submit_image(&state, upload, job).await
}
