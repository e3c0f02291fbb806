//! OpenAPI documentation.
//! API version is in `crate::constants::API_VERSION`.
//! Paths in handler annotations use placeholder /api/v0; they are rewritten at runtime to the actual version.

use utoipa::OpenApi;

use crate::constants::{API_BASE, API_VERSION};
use crate::error;
use crate::handlers;
use crate::setup::health;
use studenthub_core::models;

/// Placeholder version used in handler path annotations (utoipa requires compile-time literals).
const OPENAPI_PATH_PLACEHOLDER: &str = "/api/v0";

fn transform_openapi_paths(spec: &mut utoipa::openapi::OpenApi, version: &str) {
    let replacement = format!("{}/{}", API_BASE, version);
    if OPENAPI_PATH_PLACEHOLDER == replacement {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = key.replacen(OPENAPI_PATH_PLACEHOLDER, &replacement, 1);
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI spec with path placeholders replaced by the current API version.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    transform_openapi_paths(&mut spec, API_VERSION);
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StudentHub Tools API",
        version = "0.1.0",
        description = "Stateless file and text tools (v0). File tools return a session ticket; poll the session and download the result once before it expires. All tool endpoints are versioned under /api/v0/."
    ),
    paths(
        // Image tools
        handlers::image_tools::resize_image,
        handlers::image_tools::compress_image,
        handlers::image_tools::convert_image,
        // PDF tools
        handlers::document_tools::pdf_to_text,
        handlers::document_tools::split_pdf,
        handlers::document_tools::merge_pdfs,
        handlers::document_tools::compress_pdf,
        // Text tools
        handlers::text_tools::text_to_pdf,
        handlers::text_tools::text_stats,
        handlers::text_tools::grammar_check,
        handlers::text_tools::summarize_text,
        // Sessions
        handlers::sessions::get_session_status,
        handlers::download::download_artifact,
        // Health
        health::health_check,
        health::liveness_check,
    ),
    components(
        schemas(
            models::SessionTicketResponse,
            models::SessionStatusResponse,
            models::SessionState,
            models::ImageResizeParams,
            models::ImageCompressParams,
            models::ImageConvertParams,
            models::ImageOutputFormat,
            models::PdfSplitParams,
            models::TextToPdfRequest,
            models::TextRequest,
            models::SummarizeRequest,
            models::TextStats,
            models::GrammarReport,
            models::GrammarIssue,
            models::GrammarIssueKind,
            models::Summary,
            health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "image-tools", description = "Resize, compress and convert images"),
        (name = "pdf-tools", description = "Extract text from, split and compress PDFs"),
        (name = "text-tools", description = "Render text as PDF and analyse text"),
        (name = "sessions", description = "Poll and download tool results"),
        (name = "health", description = "Liveness and health probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_tool_paths() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/v0/tools/image/resize"));
        assert!(spec.paths.paths.contains_key("/api/v0/tools/pdf/merge"));
        assert!(spec.paths.paths.contains_key("/api/v0/download/{id}"));
        assert!(spec.paths.paths.contains_key("/health"));
    }
}
