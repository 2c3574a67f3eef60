//! Object storage for uploaded listing images.
//!
//! Uploaded images live outside the database; the database keeps the public
//! URL plus the storage key needed to delete the object later.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{AppError, AppResult};

/// Metadata for a stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Storage key (path or object key). Kept for later deletion.
    pub key: String,
    /// Public URL to access the object.
    pub url: String,
    /// Object size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
}

/// Storage backend trait.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload an object.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredObject>;

    /// Delete an object.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Type alias for a shared storage backend.
pub type StorageService = std::sync::Arc<dyn StorageBackend>;

/// Build a storage key for an uploaded listing image.
///
/// Keys group objects by listing so a listing's images share a prefix.
#[must_use]
pub fn generate_storage_key(listing_id: &str, image_id: &str, file_name: &str) -> String {
    // Keep only a conservative character set from the client-supplied name.
    let safe_name: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("templates/{listing_id}/{image_id}-{safe_name}")
}

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self { base_path, base_url }
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredObject> {
        let path = self.base_path.join(key);

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}
