//! Constants shared across the API surface.

/// URL prefix for versioned API routes.
pub const API_PREFIX: &str = "/api/v0";
