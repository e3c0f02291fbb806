//! Route configuration and setup

use crate::api_doc::get_openapi_spec;
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::setup::health::{health_check, liveness_check};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use studenthub_core::Config;
use studenthub_infra::{
    request_id_middleware, security_headers_middleware, SecurityHeadersConfig,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Headroom on top of the largest file for multipart boundaries and form fields
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let security_headers_config = Arc::new(SecurityHeadersConfig {
        hsts: config.is_production(),
    });

    let body_limit = config
        .max_image_size_bytes()
        .max(config.max_document_size_bytes())
        .max(config.max_text_length().saturating_mul(4))
        + MULTIPART_OVERHEAD_BYTES;

    tracing::info!(
        http_concurrency_limit = config.http_concurrency_limit(),
        request_timeout_secs = config.request_timeout().as_secs(),
        body_limit,
        "HTTP limits configured"
    );

    let app = public_routes()
        .merge(tool_routes())
        .merge(session_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Health probes and the OpenAPI document
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(get_openapi_spec()) }),
        )
}

/// File tools answer with a session ticket; text utilities answer inline
fn tool_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/tools/image/resize", API_PREFIX),
            post(handlers::image_tools::resize_image),
        )
        .route(
            &format!("{}/tools/image/compress", API_PREFIX),
            post(handlers::image_tools::compress_image),
        )
        .route(
            &format!("{}/tools/image/convert", API_PREFIX),
            post(handlers::image_tools::convert_image),
        )
        .route(
            &format!("{}/tools/pdf/to-text", API_PREFIX),
            post(handlers::document_tools::pdf_to_text),
        )
        .route(
            &format!("{}/tools/pdf/split", API_PREFIX),
            post(handlers::document_tools::split_pdf),
        )
        .route(
            &format!("{}/tools/pdf/merge", API_PREFIX),
            post(handlers::document_tools::merge_pdfs),
        )
        .route(
            &format!("{}/tools/pdf/compress", API_PREFIX),
            post(handlers::document_tools::compress_pdf),
        )
        .route(
            &format!("{}/tools/text/to-pdf", API_PREFIX),
            post(handlers::text_tools::text_to_pdf),
        )
        .route(
            &format!("{}/tools/text/stats", API_PREFIX),
            post(handlers::text_tools::text_stats),
        )
        .route(
            &format!("{}/tools/text/grammar", API_PREFIX),
            post(handlers::text_tools::grammar_check),
        )
        .route(
            &format!("{}/tools/text/summarize", API_PREFIX),
            post(handlers::text_tools::summarize_text),
        )
}

fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/sessions/{{id}}", API_PREFIX),
            get(handlers::sessions::get_session_status),
        )
        .route(
            &format!("{}/download/{{id}}", API_PREFIX),
            get(handlers::download::download_artifact),
        )
}
