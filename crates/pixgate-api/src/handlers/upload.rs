use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pixgate_core::AppError;

use crate::error::HttpAppError;
use crate::services::upload::UploadVerdict;
use crate::state::AppState;
use crate::utils::upload::{declared_content_length, extract_multipart_file};

/// Upload file handler
///
/// Runs the uploaded file through the validation pipeline and answers with
/// its metadata. Files the pipeline drops are not distinguished from a
/// request that carried no file at all.
///
/// # Errors
/// - `AppError::FileTooSmall` - Declared request size below the minimum
/// - `AppError::InvalidInput` - Malformed multipart data or no usable file
/// - `AppError::InvalidImageContent` - File does not decode to a real image
/// - `AppError::Storage` - Upload directory not writable
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let declared_length = declared_content_length(&headers);
    let (data, original_name, content_type) = extract_multipart_file(multipart).await?;

    let verdict = state
        .uploads
        .pipeline
        .run(declared_length, &original_name, &content_type, data)
        .await?;

    match verdict {
        UploadVerdict::Accepted(accepted) => Ok((StatusCode::OK, Json(accepted)).into_response()),
        UploadVerdict::Discarded(reason) => {
            tracing::debug!(reason = ?reason, "Discarded upload reported as missing file");
            Err(HttpAppError(AppError::InvalidInput(
                "No file attached".to_string(),
            )))
        }
    }
}
