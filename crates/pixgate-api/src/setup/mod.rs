//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use pixgate_core::Config;
use pixgate_storage::{LocalStorage, Storage};

use crate::services::upload::UploadPipeline;
use crate::state::{AppState, StorageState, UploadState};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    // Initialize telemetry first
    crate::telemetry::init_telemetry();

    tracing::info!("Configuration loaded and validated successfully");

    // Setup storage for the upload directory
    let upload_dir = config.upload_dir();
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(&upload_dir)
            .await
            .with_context(|| format!("Failed to prepare upload directory {}", upload_dir.display()))?,
    );

    // Build the validation pipeline
    let pipeline = Arc::new(UploadPipeline::new(
        storage.clone(),
        config.allowed_content_types().to_vec(),
        config.min_file_size_bytes(),
    ));

    let state = Arc::new(AppState {
        is_production: config.is_production(),
        config: config.clone(),
        storage: StorageState { storage },
        uploads: UploadState { pipeline },
    });

    // Setup routes
    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}
