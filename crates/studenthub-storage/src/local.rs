use crate::keys::{OUTPUTS_DIR, UPLOADS_DIR};
use crate::traits::{ArtifactStorage, ByteStream, FileRemover, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage for temporary artifacts
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Temp root for artifacts (e.g., "/tmp/studenthub")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        for dir in [UPLOADS_DIR, OUTPUTS_DIR] {
            fs::create_dir_all(base_path.join(dir)).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    base_path.join(dir).display(),
                    e
                ))
            })?;
        }

        let base_path = fs::canonicalize(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys that could escape the temp root.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let relative = Path::new(storage_key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(self.base_path.join(relative))
    }

    /// Reject paths that are not under the temp root
    fn ensure_owned(&self, path: &Path) -> StorageResult<()> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if escapes || !path.starts_with(&self.base_path) {
            return Err(StorageError::InvalidKey(format!(
                "{} is outside the storage directory",
                path.display()
            )));
        }
        Ok(())
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Delete every file left in the upload and output directories.
    ///
    /// Sessions live in memory, so anything on disk at start-up belongs to a
    /// previous process and can never be addressed again.
    pub async fn purge_orphans(&self) -> StorageResult<usize> {
        let mut removed = 0;

        for dir in [UPLOADS_DIR, OUTPUTS_DIR] {
            let mut entries = fs::read_dir(self.base_path.join(dir)).await?;
            while let Some(entry) = entries.next_entry().await? {
                if !entry.file_type().await?.is_file() {
                    continue;
                }
                match fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        tracing::warn!(
                            path = %entry.path().display(),
                            error = %e,
                            "Failed to purge orphaned artifact"
                        );
                    }
                }
            }
        }

        if removed > 0 {
            tracing::info!(
                root = %self.base_path.display(),
                removed,
                "Purged orphaned artifacts from previous run"
            );
        }

        Ok(removed)
    }
}

#[async_trait]
impl FileRemover for LocalStorage {
    async fn remove(&self, path: &Path) -> StorageResult<()> {
        self.ensure_owned(path)?;
        let start = std::time::Instant::now();

        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(
                    path = %path.display(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl ArtifactStorage for LocalStorage {
    fn root(&self) -> &Path {
        &self.base_path
    }

    async fn write(&self, key: &str, data: Bytes) -> StorageResult<PathBuf> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.flush().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to flush file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(path)
    }

    async fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        self.ensure_owned(path)?;

        fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.display().to_string())
            } else {
                StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
            }
        })
    }

    async fn open_stream(&self, path: &Path) -> StorageResult<(u64, ByteStream)> {
        self.ensure_owned(path)?;
        let start = std::time::Instant::now();

        let file = fs::File::open(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.display().to_string())
            } else {
                StorageError::ReadFailed(format!("Failed to open file {}: {}", path.display(), e))
            }
        })?;
        let length = file.metadata().await?.len();

        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(
                    path = %path_display,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    error = %e,
                    "Local storage stream read error"
                );
                StorageError::ReadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok((length, Box::pin(stream)))
    }

    async fn health_check(&self) -> StorageResult<()> {
        let probe = self.base_path.join(".health");
        fs::write(&probe, b"ok").await?;
        fs::remove_file(&probe).await?;
        Ok(())
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use crate::keys;
    use futures::StreamExt;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_storage_write_read() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let key = keys::upload_key("txt");
        let path = storage
            .write(&key, Bytes::from_static(b"test data"))
            .await
            .unwrap();

        assert!(path.is_absolute());
        assert!(path.starts_with(storage.root()));
        assert_eq!(storage.read(&path).await.unwrap(), b"test data");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.write("../../../etc/passwd", Bytes::new()).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.key_to_path("/etc/passwd");
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.remove(Path::new("/etc/passwd")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let sneaky = storage.root().join("uploads/../../outside");
        let result = storage.read(&sneaky).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let path = storage.key_to_path("outputs/nonexistent.txt").unwrap();
        assert!(storage.remove(&path).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_deletes_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let path = storage
            .write(&keys::output_key("bin"), Bytes::from_static(b"x"))
            .await
            .unwrap();
        assert!(path.exists());

        storage.remove(&path).await.unwrap();
        assert!(!path.exists());
        // Second delete of the same path is a no-op
        storage.remove(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_storage_stream_read() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data = b"stream download test".to_vec();
        let path = storage
            .write(&keys::output_key("txt"), Bytes::from(data.clone()))
            .await
            .unwrap();

        let (length, mut stream) = storage.open_stream(&path).await.unwrap();
        assert_eq!(length, data.len() as u64);

        let mut downloaded = Vec::new();
        while let Some(chunk_result) = stream.next().await {
            downloaded.extend_from_slice(&chunk_result.unwrap());
        }
        assert_eq!(data, downloaded);
    }

    #[tokio::test]
    async fn test_open_stream_missing_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let path = storage.key_to_path("outputs/gone.txt").unwrap();
        let result = storage.open_stream(&path).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_purge_orphans() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let a = storage
            .write(&keys::upload_key("pdf"), Bytes::from_static(b"a"))
            .await
            .unwrap();
        let b = storage
            .write(&keys::output_key("txt"), Bytes::from_static(b"b"))
            .await
            .unwrap();

        assert_eq!(storage.purge_orphans().await.unwrap(), 2);
        assert!(!a.exists());
        assert!(!b.exists());
        assert!(storage.health_check().await.is_ok());
    }
}
