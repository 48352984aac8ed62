//! File storage for uploaded user avatars.
//!
//! Uploads are content-addressed: the storage key is
//! `<prefix>/<sha256 of bytes>.<ext>`, so re-uploading the same image yields
//! the same key. Only the key is persisted in the database; responses expose
//! the public URL built by [`FileStorage::get_url`].
//!
//! # Example
//!
//! ```ignore
//! use xs_core::file_storage::{FileStorage, LocalFileStorage};
//!
//! let storage = LocalFileStorage::new("./storage/uploads".into(), "http://localhost:3000/files".into());
//! let key = storage.save_image("users", "image/png", &bytes).await?;
//! let url = storage.get_url(&key)?;
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File exceeds maximum size of {max_bytes} bytes")]
    InvalidFileSize { max_bytes: usize },

    #[error("MIME type '{received}' not allowed. Allowed types: {}", .allowed.join(", "))]
    InvalidMimeType {
        received: String,
        allowed: Vec<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Storage backend seam. Object-safe so the app state can hold `Arc<dyn FileStorage>`.
pub trait FileStorage: Send + Sync {
    /// Validates and stores an image, returning its storage key.
    fn save_image<'a>(
        &'a self,
        prefix: &'a str,
        content_type: &'a str,
        content: &'a [u8],
    ) -> StorageFuture<'a, String>;

    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self::with_max_size(base_dir, base_url, DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_size(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
        }
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\')
        {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with a separator".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }

    fn extension_for(content_type: &str) -> Result<&'static str, StorageError> {
        ALLOWED_IMAGE_TYPES
            .iter()
            .find(|(mime, _)| *mime == content_type)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| StorageError::InvalidMimeType {
                received: content_type.to_string(),
                allowed: ALLOWED_IMAGE_TYPES
                    .iter()
                    .map(|(mime, _)| mime.to_string())
                    .collect(),
            })
    }

    /// Computes the key an upload would be stored under.
    pub fn key_for(
        &self,
        prefix: &str,
        content_type: &str,
        content: &[u8],
    ) -> Result<String, StorageError> {
        let ext = Self::extension_for(content_type)?;
        if content.len() > self.max_file_size {
            return Err(StorageError::InvalidFileSize {
                max_bytes: self.max_file_size,
            });
        }
        let digest = hex::encode(Sha256::digest(content));
        let key = format!("{}/{}.{}", prefix.trim_matches('/'), digest, ext);
        Self::validate_key(&key)?;
        Ok(key)
    }
}

impl FileStorage for LocalFileStorage {
    fn save_image<'a>(
        &'a self,
        prefix: &'a str,
        content_type: &'a str,
        content: &'a [u8],
    ) -> StorageFuture<'a, String> {
        Box::pin(async move {
            let key = self.key_for(prefix, content_type, content)?;
            let file_path = self.base_dir.join(&key);

            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            tracing::debug!(key = %key, bytes = content.len(), "stored upload");
            Ok(key)
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}
