//! Ephemeral artifact sessions
//!
//! A session maps an opaque id to the uploaded input, the produced output and
//! a fixed expiry. Files are owned by exactly one session and deleted exactly
//! once: by the sweeper, by a lookup that notices expiry, or by the release
//! that follows a download.

mod error;
mod lease;
mod store;
#[cfg(feature = "cleanup")]
mod sweep;

pub use error::SessionError;
pub use lease::DownloadLease;
pub use store::{SessionStore, StoreSettings, SweepReport};
#[cfg(feature = "cleanup")]
pub use sweep::{SessionSweeper, SweeperHandle};
