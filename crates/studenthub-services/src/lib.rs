//! StudentHub Services Layer
//!
//! Hosts the ephemeral artifact session store that every upload, convert and
//! download tool goes through, and the background sweeper that evicts expired
//! sessions. Keep coordination here; keep thin HTTP handling in studenthub-api.

pub mod sessions;

#[cfg(feature = "cleanup")]
pub use sessions::{SessionSweeper, SweeperHandle};
pub use sessions::{DownloadLease, SessionError, SessionStore, StoreSettings, SweepReport};
pub use studenthub_storage::{ArtifactStorage, FileRemover, LocalStorage, StorageError};
