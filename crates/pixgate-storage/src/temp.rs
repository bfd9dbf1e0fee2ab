//! Scoped handle for a stored upload awaiting a validation verdict.

use std::sync::Arc;

use crate::traits::{Storage, StorageResult};

/// A stored file whose retention is still undecided.
///
/// The upload pipeline writes the file first and inspects it afterwards;
/// whatever the verdict, `discard` removes the file again. Cleanup failures
/// must never mask the verdict, so deletion errors are logged and swallowed.
pub struct TempUpload {
    storage: Arc<dyn Storage>,
    key: String,
}

impl TempUpload {
    pub fn new(storage: Arc<dyn Storage>, key: String) -> Self {
        TempUpload { storage, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored bytes back from the backend.
    pub async fn read(&self) -> StorageResult<Vec<u8>> {
        self.storage.read(&self.key).await
    }

    /// Remove the stored file, consuming the handle.
    pub async fn discard(self) {
        if let Err(e) = self.storage.delete(&self.key).await {
            tracing::warn!(
                key = %self.key,
                error = %e,
                "Failed to delete temporary upload"
            );
        }
    }
}
