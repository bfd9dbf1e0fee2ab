//! Upload validation service.

mod service;
mod types;

pub use service::UploadPipeline;
pub use types::{AcceptedUpload, DiscardReason, UploadVerdict};
