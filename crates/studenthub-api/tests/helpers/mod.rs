//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p studenthub-api`.

#![allow(dead_code)]

pub mod fixtures;
pub mod workflows;

use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;
use studenthub_api::constants;
use studenthub_api::setup::routes;
use studenthub_api::state::{AppState, ValidatorSet};
use studenthub_api::ToolJobRunner;
use studenthub_core::{Config, ManualClock, ToolsConfig};
use studenthub_processing::{MediaValidator, ToolKind};
use studenthub_services::{LocalStorage, SessionStore, StoreSettings};
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, state, controllable clock and owned temp root.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Files currently under the temp root, across uploads and outputs
    pub fn stored_files(&self) -> usize {
        ["uploads", "outputs"]
            .iter()
            .map(|dir| {
                std::fs::read_dir(self._temp_dir.path().join(dir))
                    .map(|entries| entries.count())
                    .unwrap_or(0)
            })
            .sum()
    }
}

/// Build a config rooted at `temp_dir` with `overrides` applied
pub fn test_config(temp_dir: &TempDir, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert(
        "TEMP_STORAGE_PATH".to_string(),
        temp_dir.path().to_string_lossy().to_string(),
    );
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    let tools = ToolsConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("Failed to build test config");
    Config(Box::new(tools))
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

/// Build the app around a manual clock so tests can move past expiry
pub async fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(&temp_dir, overrides);

    let storage = Arc::new(
        LocalStorage::new(config.temp_storage_path())
            .await
            .expect("Failed to create local storage"),
    );
    let clock = Arc::new(ManualClock::starting_now());
    let sessions = Arc::new(SessionStore::new(
        clock.clone(),
        storage.clone(),
        StoreSettings {
            release_grace: config.download_release_grace(),
            lease_timeout: config.download_lease_timeout(),
        },
    ));
    let jobs = ToolJobRunner::new(sessions.clone(), storage.clone(), config.session_ttl());

    let state = Arc::new(AppState {
        validators: ValidatorSet {
            image: MediaValidator::for_tool(ToolKind::Image, &config),
            document: MediaValidator::for_tool(ToolKind::Document, &config),
        },
        config: config.clone(),
        sessions,
        storage,
        jobs,
    });

    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        clock,
        _temp_dir: temp_dir,
    }
}
