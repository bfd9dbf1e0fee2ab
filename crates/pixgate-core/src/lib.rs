//! Pixgate Core Library
//!
//! This crate provides the error types and configuration shared across all
//! Pixgate components.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{BaseConfig, Config, UploadServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
