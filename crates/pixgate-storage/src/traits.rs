//! Storage trait definitions and error types.

use async_trait::async_trait;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to store file: {0}")]
    StoreFailed(String),

    #[error("Failed to read file: {0}")]
    ReadFailed(String),

    #[error("Failed to delete file: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Abstraction over the upload destination.
///
/// Keys are flat file names relative to the backend's root; implementations
/// must reject keys that would escape it.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store a file under the given name and return its storage key.
    ///
    /// The backing directory is created if it no longer exists, so a
    /// destination removed at runtime does not fail subsequent stores.
    async fn store(&self, filename: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Read a stored file back in full.
    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a stored file. Deleting a missing file is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check whether a file exists under this key.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
