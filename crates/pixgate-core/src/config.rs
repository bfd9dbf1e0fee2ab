//! Configuration module
//!
//! This module provides configuration structures for the upload service,
//! including server, storage-path, validation-limit, and rate-limit settings.

use std::env;
use std::path::{Component, Path, PathBuf};

// Common constants
const RATE_LIMIT_MAX_REQUESTS: u32 = 50;
const RATE_LIMIT_WINDOW_SECS: u64 = 900;

/// Base configuration shared by the HTTP surface
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_seconds: u64,
    pub environment: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub base: BaseConfig,
    // Filesystem layout
    pub public_dir: String,
    // Optional subdirectory of the public dir used as the upload destination.
    // Unset means files land directly in the public dir.
    pub upload_temp_subdir: Option<String>,
    // Upload validation configuration
    pub min_file_size_bytes: u64,
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

/// Application configuration (upload service).
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn as_upload(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        self.as_upload()
            .base
            .environment
            .to_lowercase()
            .eq("production")
            || self.as_upload().base.environment.to_lowercase().eq("prod")
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_upload().validate()
    }

    // Convenience getters for common fields
    pub fn server_host(&self) -> &str {
        &self.as_upload().base.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.as_upload().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_upload().base.cors_origins
    }

    pub fn rate_limit_max_requests(&self) -> u32 {
        self.as_upload().base.rate_limit_max_requests
    }

    pub fn rate_limit_window_seconds(&self) -> u64 {
        self.as_upload().base.rate_limit_window_seconds
    }

    pub fn environment(&self) -> &str {
        &self.as_upload().base.environment
    }

    pub fn public_dir(&self) -> &Path {
        Path::new(&self.as_upload().public_dir)
    }

    /// Destination directory for uploaded files: the public dir itself, or a
    /// subdirectory of it when UPLOAD_PATH_TEMP is set.
    pub fn upload_dir(&self) -> PathBuf {
        match self.as_upload().upload_temp_subdir.as_deref() {
            Some(subdir) => self.public_dir().join(subdir),
            None => self.public_dir().to_path_buf(),
        }
    }

    pub fn min_file_size_bytes(&self) -> u64 {
        self.as_upload().min_file_size_bytes
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_upload().max_file_size_bytes
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_upload().allowed_content_types
    }
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MIN_FILE_SIZE_BYTES: u64 = 2048;
        const MAX_FILE_SIZE_MB: usize = 10;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| {
                "image/png,image/jpg,image/jpeg,image/gif,image/svg+xml".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let base = BaseConfig {
            server_host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| RATE_LIMIT_MAX_REQUESTS.to_string())
                .parse()
                .unwrap_or(RATE_LIMIT_MAX_REQUESTS),
            rate_limit_window_seconds: env::var("RATE_LIMIT_WINDOW_SECONDS")
                .unwrap_or_else(|_| RATE_LIMIT_WINDOW_SECS.to_string())
                .parse()
                .unwrap_or(RATE_LIMIT_WINDOW_SECS),
            environment,
        };

        let config = UploadServiceConfig {
            base,
            public_dir: env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
            upload_temp_subdir: env::var("UPLOAD_PATH_TEMP").ok().filter(|s| !s.is_empty()),
            min_file_size_bytes: env::var("MIN_FILE_SIZE_BYTES")
                .unwrap_or_else(|_| MIN_FILE_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(MIN_FILE_SIZE_BYTES),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_content_types,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.public_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("PUBLIC_DIR cannot be empty"));
        }

        if let Some(subdir) = &self.upload_temp_subdir {
            let path = Path::new(subdir);
            if path.is_absolute()
                || path
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_)))
            {
                return Err(anyhow::anyhow!(
                    "UPLOAD_PATH_TEMP must be a relative path without parent components"
                ));
            }
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        if self.min_file_size_bytes as usize >= self.max_file_size_bytes {
            return Err(anyhow::anyhow!(
                "MIN_FILE_SIZE_BYTES must be smaller than the maximum upload size"
            ));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES cannot be empty"));
        }

        if self.base.rate_limit_max_requests == 0 {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_MAX_REQUESTS must be greater than zero"
            ));
        }

        if self.base.rate_limit_window_seconds == 0 {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_WINDOW_SECONDS must be greater than zero"
            ));
        }

        Ok(())
    }
}
