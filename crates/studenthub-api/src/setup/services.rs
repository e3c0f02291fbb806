//! Service initialization

use crate::services::ToolJobRunner;
use crate::state::{AppState, ValidatorSet};
use anyhow::{Context, Result};
use std::sync::Arc;
use studenthub_core::{Config, SystemClock};
use studenthub_processing::{MediaValidator, ToolKind};
use studenthub_services::{LocalStorage, SessionStore, StoreSettings};

/// Build the temp root, the session store and everything handlers need
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let storage = Arc::new(
        LocalStorage::new(config.temp_storage_path())
            .await
            .with_context(|| {
                format!(
                    "Failed to prepare temp storage at {}",
                    config.temp_storage_path().display()
                )
            })?,
    );

    // Nothing survives a restart: files from a previous run have no session
    let purged = storage
        .purge_orphans()
        .await
        .context("Failed to purge orphaned artifacts")?;
    if purged > 0 {
        tracing::info!(purged, "Removed artifacts left over from a previous run");
    }

    let sessions = Arc::new(SessionStore::new(
        Arc::new(SystemClock),
        storage.clone(),
        StoreSettings {
            release_grace: config.download_release_grace(),
            lease_timeout: config.download_lease_timeout(),
        },
    ));

    let jobs = ToolJobRunner::new(sessions.clone(), storage.clone(), config.session_ttl());

    let validators = ValidatorSet {
        image: MediaValidator::for_tool(ToolKind::Image, config),
        document: MediaValidator::for_tool(ToolKind::Document, config),
    };

    tracing::info!(
        temp_root = %config.temp_storage_path().display(),
        session_ttl_secs = config.session_ttl().as_secs(),
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        sessions,
        storage,
        jobs,
        validators,
    }))
}
