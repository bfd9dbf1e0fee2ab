//! Pixgate Processing Library
//!
//! Content inspection for uploaded files: magic-byte type sniffing and
//! image dimension probing.

pub mod probe;
pub mod sniff;
mod svg;

// Re-export commonly used types
pub use probe::{ImageProbe, ImageProbeError};
pub use sniff::{detect_image_kind, ImageKind};
