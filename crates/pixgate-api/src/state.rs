//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef`.

use std::sync::Arc;

use pixgate_core::Config;
use pixgate_storage::Storage;

use crate::services::upload::UploadPipeline;

// ----- Sub-state types -----

/// Storage backend for uploaded files.
#[derive(Clone)]
pub struct StorageState {
    pub storage: Arc<dyn Storage>,
}

/// Upload validation pipeline.
#[derive(Clone)]
pub struct UploadState {
    pub pipeline: Arc<UploadPipeline>,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: StorageState,
    pub uploads: UploadState,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for StorageState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.storage.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for UploadState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.uploads.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
