//! Storage abstraction traits
//!
//! [`ArtifactStorage`] persists tool inputs and outputs; [`FileRemover`] is the
//! leaf deletion primitive used by the session store.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use studenthub_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::WriteFailed(msg)
            | StorageError::ReadFailed(msg)
            | StorageError::DeleteFailed(msg) => AppError::Storage(msg),
            StorageError::IoError(e) => AppError::Storage(format!("IO error: {}", e)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Stream of file chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Deletes a single file.
///
/// A file that is already gone counts as deleted: implementations return `Ok(())`.
#[async_trait]
pub trait FileRemover: Send + Sync {
    async fn remove(&self, path: &Path) -> StorageResult<()>;
}

/// Temporary artifact storage
///
/// All paths returned are absolute and live under [`ArtifactStorage::root`].
#[async_trait]
pub trait ArtifactStorage: FileRemover {
    /// Root directory of the store
    fn root(&self) -> &Path;

    /// Write `data` under `key` and return the absolute path
    async fn write(&self, key: &str, data: Bytes) -> StorageResult<PathBuf>;

    /// Read a whole file owned by this store
    async fn read(&self, path: &Path) -> StorageResult<Vec<u8>>;

    /// Open a file owned by this store as a chunk stream, with its length
    async fn open_stream(&self, path: &Path) -> StorageResult<(u64, ByteStream)>;

    /// Check that the root is present and writable
    async fn health_check(&self) -> StorageResult<()>;
}
