//! Local filesystem persistence for ingested assets.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Wrote zero bytes to {0}")]
    EmptyWrite(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Path {0} escapes the storage root")]
    PathOutsideRoot(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Bytes persisted on disk for one `(identifier, role)` pair.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub path: PathBuf,
    pub len: u64,
}

/// Local filesystem storage rooted at a fixed directory.
///
/// The root is created once at construction; a failure there is fatal at
/// startup and never surfaces per request. All operations refuse paths
/// outside the root.
#[derive(Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Create the store, creating the root directory if absent.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage root {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(AssetStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_under_root(&self, path: &Path) -> StorageResult<()> {
        if !path.starts_with(&self.root) {
            return Err(StorageError::PathOutsideRoot(path.display().to_string()));
        }
        Ok(())
    }

    /// Write `data` to `path`, creating parent directories, syncing to disk,
    /// and verifying a non-empty file landed. A zero-length file after a
    /// successful write call is reported as `EmptyWrite`, not success.
    pub async fn write(&self, path: &Path, data: &[u8]) -> StorageResult<UploadedAsset> {
        self.ensure_under_root(path)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let start = std::time::Instant::now();

        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let len = fs::metadata(path)
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to stat file {} after write: {}",
                    path.display(),
                    e
                ))
            })?
            .len();

        if len == 0 {
            return Err(StorageError::EmptyWrite(path.display().to_string()));
        }

        tracing::info!(
            path = %path.display(),
            size_bytes = len,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Asset written"
        );

        Ok(UploadedAsset {
            path: path.to_path_buf(),
            len,
        })
    }

    /// Delete a file. Idempotent: deleting an absent file succeeds.
    pub async fn delete(&self, path: &Path) -> StorageResult<()> {
        self.ensure_under_root(path)?;

        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), "Asset deleted");

        Ok(())
    }

    /// Remove one request's directory and everything in it. Idempotent.
    pub async fn remove_request_dir(&self, dir: &Path) -> StorageResult<()> {
        self.ensure_under_root(dir)?;

        if !fs::try_exists(dir).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_dir_all(dir).await.map_err(|e| {
            StorageError::DeleteFailed(format!(
                "Failed to remove directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        tracing::info!(dir = %dir.display(), "Request directory removed");

        Ok(())
    }

    pub async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Size in bytes of an asset on disk.
    pub async fn len(&self, path: &Path) -> StorageResult<u64> {
        let meta = fs::metadata(path)
            .await
            .map_err(|_| StorageError::NotFound(path.display().to_string()))?;
        Ok(meta.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_and_len() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path()).await.unwrap();

        let path = dir.path().join("abc123/original.mp4");
        let asset = store.write(&path, b"video bytes").await.unwrap();

        assert_eq!(asset.len, 11);
        assert!(store.exists(&path).await);
        assert_eq!(store.len(&path).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_write_rejects_empty_payload() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path()).await.unwrap();

        let path = dir.path().join("abc123/original.mp4");
        let result = store.write(&path, b"").await;
        assert!(matches!(result, Err(StorageError::EmptyWrite(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path()).await.unwrap();

        let path = dir.path().join("abc123/original.mp4");
        store.write(&path, b"data").await.unwrap();

        store.delete(&path).await.unwrap();
        assert!(!store.exists(&path).await);
        // Second delete of the same path is still Ok
        store.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_request_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path()).await.unwrap();

        let request_dir = dir.path().join("abc123");
        store
            .write(&request_dir.join("original.mov"), b"data")
            .await
            .unwrap();
        store
            .write(&request_dir.join("normalized.mp4"), b"data")
            .await
            .unwrap();

        store.remove_request_dir(&request_dir).await.unwrap();
        assert!(!store.exists(&request_dir).await);
        store.remove_request_dir(&request_dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_paths_outside_root_rejected() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path().join("root")).await.unwrap();

        let outside = dir.path().join("elsewhere/file.mp4");
        assert!(matches!(
            store.write(&outside, b"data").await,
            Err(StorageError::PathOutsideRoot(_))
        ));
        assert!(matches!(
            store.delete(&outside).await,
            Err(StorageError::PathOutsideRoot(_))
        ));
    }

    #[tokio::test]
    async fn test_len_of_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path()).await.unwrap();

        let result = store.len(&dir.path().join("missing.mp4")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
