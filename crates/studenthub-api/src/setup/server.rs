//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use studenthub_core::Config;
use studenthub_services::SweeperHandle;

/// Start the server with graceful shutdown
///
/// The session sweeper is stopped once in-flight requests have drained.
pub async fn start_server(config: &Config, app: Router, sweeper: SweeperHandle) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        max_image_mb = config.max_image_size_bytes() / 1024 / 1024,
        max_document_mb = config.max_document_size_bytes() / 1024 / 1024,
        image_extensions = %config.image_allowed_extensions().join(","),
        document_extensions = %config.document_allowed_extensions().join(","),
        session_ttl_secs = config.session_ttl().as_secs(),
        "Server ready and accepting connections"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sweeper.stop().await;
    studenthub_infra::shutdown_telemetry().await;

    served?;
    Ok(())
}

/// Signal handler for graceful shutdown
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM signals to initiate graceful shutdown.
///
/// # Panics
/// - Panics if Ctrl+C signal handler cannot be installed (unrecoverable system error)
/// - On Unix systems, panics if SIGTERM signal handler cannot be installed (unrecoverable system error)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
