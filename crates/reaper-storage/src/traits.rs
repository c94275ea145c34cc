//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::keys;
use crate::StorageBackend;
use async_trait::async_trait;
use reaper_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigError(msg) => AppError::InvalidConfig(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The reaper only needs to locate and delete blobs.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Delete a file by its storage key. Deleting a missing file succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Whether files are served by the forum itself rather than a remote store.
    fn is_internal(&self) -> bool {
        self.backend_type().is_internal()
    }

    /// Base URL without scheme or host, as stored in upload URLs of an
    /// internal store.
    fn relative_base_url(&self) -> String;

    /// Fully qualified (possibly protocol-relative) base URL.
    fn absolute_base_url(&self) -> String;

    /// The base URL upload rows are stored under for this backend.
    fn base_url(&self) -> String {
        if self.is_internal() {
            self.relative_base_url()
        } else {
            self.absolute_base_url()
        }
    }

    /// Map an upload URL to the storage key of its blob.
    fn storage_key_for_url(&self, url: &str) -> StorageResult<String> {
        keys::key_for_url(url, &[&self.absolute_base_url(), &self.relative_base_url()])
    }
}
