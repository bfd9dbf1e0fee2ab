//! Multipart extraction and request parsing helpers for uploads.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::{header, HeaderMap, StatusCode};
use pixgate_core::AppError;

/// Longest extension kept when deriving a storage name from a client filename.
const MAX_EXTENSION_LENGTH: usize = 10;

/// Extract the single `file` field from a multipart request.
///
/// Returns the file bytes, the original filename, and the declared content type.
/// Missing filename or content type fall back to `unknown` and
/// `application/octet-stream` so later checks always have a value to work with.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
) -> Result<(Vec<u8>, String, String), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut original_filename: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "file" {
            if file_data.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }

            original_filename = field.file_name().map(|s| s.to_string());
            content_type = field.content_type().map(|s| s.to_string());

            let data = field.bytes().await.map_err(read_error_to_app_error)?;
            file_data = Some(data.to_vec());
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::InvalidInput("No file attached".to_string()))?;
    let original_filename = original_filename.unwrap_or_else(|| "unknown".to_string());
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    Ok((file_data, original_filename, content_type))
}

/// Body read failures from the request size limit keep their 413 semantics;
/// everything else is malformed input.
fn read_error_to_app_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File exceeds the maximum upload size".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read file data: {}", e))
    }
}

/// Strip MIME parameters (e.g. `; charset=utf-8`) and surrounding whitespace.
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

/// Parse the declared Content-Length header. Absent or unparseable values
/// yield `None`; the declared length is a client hint, not a measurement.
pub fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Derive a safe lowercase extension from a client-supplied filename.
///
/// Only ASCII alphanumerics survive, capped at a small length. A filename
/// that yields nothing usable falls back to `bin`.
pub fn sanitize_extension(filename: &str) -> String {
    let raw = filename.rsplit('.').next().unwrap_or("");
    let sanitized: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LENGTH)
        .collect::<String>()
        .to_lowercase();

    if sanitized.is_empty() {
        "bin".to_string()
    } else {
        sanitized
    }
}
