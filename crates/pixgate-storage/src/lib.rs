//! Pixgate Storage Library
//!
//! Storage abstraction for uploaded files: a `Storage` trait, the local
//! filesystem backend, and a scoped handle for files pending validation.

pub mod local;
pub mod temp;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use temp::TempUpload;
pub use traits::{Storage, StorageError, StorageResult};
