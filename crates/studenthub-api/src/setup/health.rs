//! Health probes

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
    pub active_sessions: usize,
    pub active_leases: usize,
}

/// Liveness probe - the process is up and serving requests
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses((status = 200, description = "Service is alive"))
)]
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "alive"
        })),
    )
}

/// Health check - temp storage is writable; reports session counts
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthCheckResponse),
        (status = 503, description = "Temp storage unavailable", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let mut response = HealthCheckResponse {
        status: "healthy".to_string(),
        storage: "unknown".to_string(),
        active_sessions: state.sessions.active_sessions().await,
        active_leases: state.sessions.active_leases().await,
    };

    let mut overall_healthy = true;

    match tokio::time::timeout(TIMEOUT, state.storage.health_check()).await {
        Ok(Ok(())) => {
            response.storage = "healthy".to_string();
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Storage health check failed");
            response.storage = format!("unhealthy: {}", e);
            overall_healthy = false;
        }
        Err(_) => {
            tracing::error!("Storage health check timed out");
            response.storage = "timeout".to_string();
            overall_healthy = false;
        }
    }

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        response.status = "unhealthy".to_string();
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
