//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p pixgate-api --test upload_test` or
//! `cargo test -p pixgate-api`.

#![allow(dead_code)]

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_test::TestServer;
use pixgate_api::constants;
use pixgate_api::setup::routes;
use pixgate_api::state::{AppState, StorageState, UploadState};
use pixgate_api::UploadPipeline;
use pixgate_core::{BaseConfig, Config, UploadServiceConfig};
use pixgate_storage::{LocalStorage, Storage};
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server and owned directories.
pub struct TestApp {
    pub server: TestServer,
    pub public_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of files currently present in the upload directory.
    pub fn upload_dir_entries(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Setup a test app with default limits and isolated directories.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup a test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with<F>(configure: F) -> TestApp
where
    F: FnOnce(&mut UploadServiceConfig),
{
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let public_dir = temp_dir.path().join("public");
    std::fs::create_dir_all(&public_dir).expect("Failed to create public directory");

    let mut inner = create_test_config(&public_dir);
    configure(&mut inner);
    let config = Config(Box::new(inner));

    let upload_dir = config.upload_dir();
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(&upload_dir)
            .await
            .expect("Failed to create local storage"),
    );
    let pipeline = Arc::new(UploadPipeline::new(
        storage.clone(),
        config.allowed_content_types().to_vec(),
        config.min_file_size_bytes(),
    ));

    let state = Arc::new(AppState {
        is_production: false,
        config: config.clone(),
        storage: StorageState { storage },
        uploads: UploadState { pipeline },
    });

    let app = routes::setup_routes(&config, state)
        .await
        .expect("Failed to setup routes");
    let server = TestServer::builder()
        .http_transport()
        .build(app.into_make_service())
        .expect("Failed to create test server");

    TestApp {
        server,
        public_dir,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

fn create_test_config(public_dir: &Path) -> UploadServiceConfig {
    UploadServiceConfig {
        base: BaseConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            cors_origins: vec!["*".to_string()],
            rate_limit_max_requests: 1000,
            rate_limit_window_seconds: 900,
            environment: "test".to_string(),
        },
        public_dir: public_dir.to_string_lossy().into_owned(),
        upload_temp_subdir: Some("tmp".to_string()),
        min_file_size_bytes: 2048,
        max_file_size_bytes: 10 * 1024 * 1024,
        allowed_content_types: vec![
            "image/png".into(),
            "image/jpg".into(),
            "image/jpeg".into(),
            "image/gif".into(),
            "image/svg+xml".into(),
        ],
    }
}
