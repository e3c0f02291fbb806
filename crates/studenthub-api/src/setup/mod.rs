//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod health;
pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use studenthub_core::Config;
use studenthub_infra::LogFormat;
use studenthub_services::{SessionSweeper, SweeperHandle};

/// Initialize the entire application
///
/// Returns the shared state, the router and the running sweeper, which the
/// server stops on shutdown.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router, SweeperHandle)> {
    // Initialize telemetry first so config problems are logged
    let log_format: LogFormat = config
        .log_format()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid log format: {}", e))?;
    studenthub_infra::init_telemetry(log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Validate configuration - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&config).await?;

    let sweeper = Arc::new(SessionSweeper::new(
        state.sessions.clone(),
        config.session_sweep_interval(),
    ))
    .start();

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router, sweeper))
}
