use crate::services::ToolJobRunner;
use std::sync::Arc;
use studenthub_core::Config;
use studenthub_processing::MediaValidator;
use studenthub_services::{ArtifactStorage, SessionStore};

/// Shared application state handed to every handler
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    pub storage: Arc<dyn ArtifactStorage>,
    pub jobs: ToolJobRunner,
    pub validators: ValidatorSet,
}

/// Upload validators per tool family
pub struct ValidatorSet {
    pub image: MediaValidator,
    pub document: MediaValidator,
}
