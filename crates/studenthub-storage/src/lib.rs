//! StudentHub Storage Library
//!
//! Temporary artifact storage for the file tools. Uploaded inputs and produced
//! outputs live under a single temp root:
//!
//! - **Inputs**: `uploads/{file_id}.{ext}`
//! - **Outputs**: `outputs/{file_id}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in
//! the `keys` module. Deletion goes through the [`FileRemover`] primitive so the
//! session store can be tested without touching the disk.

pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{ArtifactStorage, ByteStream, FileRemover, StorageError, StorageResult};
