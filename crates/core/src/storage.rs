//! Private file storage for annotation images.
//!
//! Blobs are addressed by a flat key (`annotation-<uuid>.<ext>`). The public
//! reference written onto an annotation is the file URL
//! `/private/files/<key>`, which the API serves back from the same store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::data_url::FILE_STEM;
use crate::error::CoreError;

/// URL prefix for private files.
pub const PRIVATE_FILES_URL_PREFIX: &str = "/private/files/";

// ---------------------------------------------------------------------------
// Keys and URLs
// ---------------------------------------------------------------------------

/// Generate a fresh storage key for an image with the given extension.
pub fn new_storage_key(extension: &str) -> String {
    format!("{FILE_STEM}-{}.{extension}", uuid::Uuid::new_v4().simple())
}

/// File URL for a storage key.
pub fn private_file_url(key: &str) -> String {
    format!("{PRIVATE_FILES_URL_PREFIX}{key}")
}

/// Reject keys that could escape the storage root.
///
/// Keys are single path components: non-empty, no separators, no `..`.
pub fn validate_storage_key(key: &str) -> Result<(), CoreError> {
    let invalid = key.is_empty()
        || key == "."
        || key.contains("..")
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');
    if invalid {
        return Err(CoreError::Validation(format!("Invalid file name '{key}'")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// A blob store for private files.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing blob.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError>;

    /// Read the blob stored under `key`. Missing keys are `NotFound`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, CoreError>;

    /// Remove the blob under `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// Local filesystem implementation
// ---------------------------------------------------------------------------

/// [`FileStore`] backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), CoreError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            CoreError::Internal(format!(
                "Failed to create storage root {}: {e}",
                self.root.display()
            ))
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CoreError> {
        validate_storage_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        self.ensure_root().await?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to write {}: {e}", path.display())))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, CoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CoreError::not_found("File", key))
            }
            Err(e) => Err(CoreError::Internal(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Internal(format!(
                "Failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}
