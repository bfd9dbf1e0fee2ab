//! Types produced by the upload validation pipeline.

use serde::Serialize;

/// Metadata for an upload that passed every validation stage.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedUpload {
    /// Server-assigned identifier, `{uuid}.{ext}`.
    pub file_name: String,
    /// Filename supplied by the client.
    pub original_name: String,
    /// Content type declared by the client.
    pub content_type: String,
    /// Content type detected from the stored bytes.
    pub detected_type: String,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
}

/// Why the pipeline dropped a file without reporting an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    DeclaredTypeNotAllowed,
    UnrecognizedSignature,
    SignatureNotAllowed,
}

/// Pipeline outcome. A discarded file is not a request error: the request
/// simply proceeds as if no file had been sent.
#[derive(Debug)]
pub enum UploadVerdict {
    Accepted(Box<AcceptedUpload>),
    Discarded(DiscardReason),
}
