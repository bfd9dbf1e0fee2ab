//! Pixgate API Library
//!
//! This crate provides the HTTP API handlers, middleware, and application setup.

// Module declarations
pub mod constants;
mod handlers;
mod middleware;
mod services;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
pub use services::upload::{AcceptedUpload, DiscardReason, UploadPipeline, UploadVerdict};
