//! Upload validation pipeline
//!
//! Uploads pass through five stages: a declared-size check, a declared-type
//! filter, a write to the upload directory under a server-assigned name, a
//! signature sniff of the bytes read back from disk, and a decode probe for
//! dimensions. The stored file is removed once the verdict is known,
//! whatever that verdict is.

use std::sync::Arc;

use pixgate_core::AppError;
use pixgate_processing::{detect_image_kind, ImageKind, ImageProbe};
use pixgate_storage::{Storage, TempUpload};
use uuid::Uuid;

use crate::utils::upload::{normalize_mime_type, sanitize_extension};

use super::types::{AcceptedUpload, DiscardReason, UploadVerdict};

/// Validates uploaded files before the service acknowledges them.
pub struct UploadPipeline {
    storage: Arc<dyn Storage>,
    allowed_types: Vec<String>,
    min_file_size_bytes: u64,
}

/// What inspection of the stored bytes concluded.
enum Inspection {
    Discarded(DiscardReason),
    Valid {
        kind: ImageKind,
        width: u32,
        height: u32,
    },
}

impl UploadPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        allowed_types: Vec<String>,
        min_file_size_bytes: u64,
    ) -> Self {
        let allowed_types = allowed_types.iter().map(|t| t.to_lowercase()).collect();
        Self {
            storage,
            allowed_types,
            min_file_size_bytes,
        }
    }

    /// Run the full validation workflow for one uploaded file.
    pub async fn run(
        &self,
        declared_length: Option<u64>,
        original_name: &str,
        declared_type: &str,
        data: Vec<u8>,
    ) -> Result<UploadVerdict, AppError> {
        // 1. Reject undersized requests before anything touches disk
        self.check_declared_length(declared_length)?;

        // 2. Filter on the declared content type; unlisted types are dropped,
        //    not rejected
        let declared = normalize_mime_type(declared_type).to_lowercase();
        if !self.declared_type_allowed(&declared) {
            tracing::info!(content_type = %declared, "Dropping upload with disallowed declared type");
            return Ok(UploadVerdict::Discarded(
                DiscardReason::DeclaredTypeNotAllowed,
            ));
        }

        // 3. Store under a fresh server-assigned name
        let file_uuid = Uuid::new_v4();
        let extension = sanitize_extension(original_name);
        let stored_name = format!("{}.{}", file_uuid, extension);
        let size_bytes = data.len() as u64;

        tracing::info!(
            file_uuid = %file_uuid,
            original_name = %original_name,
            size_bytes = size_bytes,
            "Processing upload"
        );

        let key = self.storage.store(&stored_name, data).await.map_err(|e| {
            tracing::error!(error = %e, file_uuid = %file_uuid, "Failed to store upload");
            AppError::Storage(e.to_string())
        })?;
        let temp = TempUpload::new(self.storage.clone(), key);

        // 4-5. Inspect what actually landed on disk; the stored file is
        // removed no matter how inspection turns out
        let inspection = self.inspect_stored(&temp).await;
        temp.discard().await;

        let (kind, width, height) = match inspection? {
            Inspection::Discarded(reason) => return Ok(UploadVerdict::Discarded(reason)),
            Inspection::Valid {
                kind,
                width,
                height,
            } => (kind, width, height),
        };

        // The identifier keeps the client extension when it fits the detected
        // type and corrects it otherwise
        let file_name = if kind.matches_extension(&extension) {
            stored_name
        } else {
            format!("{}.{}", file_uuid, kind.extension())
        };

        tracing::info!(
            file_name = %file_name,
            detected_type = kind.mime_type(),
            width = width,
            height = height,
            "Upload validated"
        );

        Ok(UploadVerdict::Accepted(Box::new(AcceptedUpload {
            file_name,
            original_name: original_name.to_string(),
            content_type: declared,
            detected_type: kind.mime_type().to_string(),
            size_bytes,
            width,
            height,
        })))
    }

    fn check_declared_length(&self, declared_length: Option<u64>) -> Result<(), AppError> {
        if let Some(declared_bytes) = declared_length {
            if declared_bytes < self.min_file_size_bytes {
                return Err(AppError::FileTooSmall {
                    declared_bytes,
                    min_bytes: self.min_file_size_bytes,
                });
            }
        }
        Ok(())
    }

    fn declared_type_allowed(&self, declared: &str) -> bool {
        self.allowed_types.iter().any(|allowed| allowed == declared)
    }

    fn detected_kind_allowed(&self, kind: ImageKind) -> bool {
        self.allowed_types
            .iter()
            .any(|allowed| kind.matches_mime(allowed))
    }

    /// Stages 4 and 5: sniff the stored bytes and probe their dimensions.
    async fn inspect_stored(&self, temp: &TempUpload) -> Result<Inspection, AppError> {
        let data = temp.read().await.map_err(|e| {
            tracing::error!(error = %e, key = %temp.key(), "Failed to read back stored upload");
            AppError::Storage(e.to_string())
        })?;

        // 4. Sniff the signature of the bytes we actually stored
        let Some(kind) = detect_image_kind(&data) else {
            tracing::info!(key = %temp.key(), "Dropping upload with unrecognized signature");
            return Ok(Inspection::Discarded(DiscardReason::UnrecognizedSignature));
        };
        if !self.detected_kind_allowed(kind) {
            tracing::info!(
                key = %temp.key(),
                detected_type = kind.mime_type(),
                "Dropping upload with disallowed signature"
            );
            return Ok(Inspection::Discarded(DiscardReason::SignatureNotAllowed));
        }

        // 5. Decode far enough to prove the file has real dimensions
        let (width, height) = self.probe_dimensions(kind, data).await?;

        Ok(Inspection::Valid {
            kind,
            width,
            height,
        })
    }

    async fn probe_dimensions(&self, kind: ImageKind, data: Vec<u8>) -> Result<(u32, u32), AppError> {
        tokio::task::spawn_blocking(move || ImageProbe::validate_and_get_dimensions(kind, &data))
            .await
            .map_err(|e| AppError::Internal(format!("Image probe task failed: {}", e)))?
            .map_err(|e| AppError::InvalidImageContent(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use pixgate_storage::LocalStorage;
    use std::io::Cursor;
    use std::path::Path;

    const ALLOWED: [&str; 5] = [
        "image/png",
        "image/jpg",
        "image/jpeg",
        "image/gif",
        "image/svg+xml",
    ];

    async fn pipeline_over(dir: &Path, allowed: &[&str], min_bytes: u64) -> UploadPipeline {
        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(dir.to_path_buf())
                .await
                .expect("create local storage"),
        );
        UploadPipeline::new(
            storage,
            allowed.iter().map(|s| s.to_string()).collect(),
            min_bytes,
        )
    }

    fn noise_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            let v = (x.wrapping_mul(31).wrapping_add(y.wrapping_mul(17)) & 0xFF) as u8;
            Rgba([v, v.wrapping_mul(3), v ^ 0x5A, 255])
        });
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .expect("encode png");
        buf.into_inner()
    }

    fn noise_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let v = (x.wrapping_mul(53).wrapping_add(y.wrapping_mul(29)) & 0xFF) as u8;
            Rgb([v, v.wrapping_add(64), v ^ 0x33])
        });
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Jpeg)
            .expect("encode jpeg");
        buf.into_inner()
    }

    fn noise_gif(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            let v = (x.wrapping_mul(41).wrapping_add(y.wrapping_mul(13)) & 0xFF) as u8;
            Rgba([v, v ^ 0x7F, v.wrapping_mul(5), 255])
        });
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Gif)
            .expect("encode gif");
        buf.into_inner()
    }

    fn svg_bytes() -> Vec<u8> {
        br##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="80"><rect width="120" height="80" fill="#09f"/></svg>"##
            .to_vec()
    }

    fn dir_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_declared_length_below_minimum_rejected() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 2048).await;

        let result = pipeline
            .run(Some(100), "a.png", "image/png", noise_png(10, 10))
            .await;

        match result {
            Err(AppError::FileTooSmall {
                declared_bytes,
                min_bytes,
            }) => {
                assert_eq!(declared_bytes, 100);
                assert_eq!(min_bytes, 2048);
            }
            other => panic!("Expected FileTooSmall, got {:?}", other),
        }
        assert_eq!(dir_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_absent_declared_length_skips_size_check() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 2048).await;

        let verdict = pipeline
            .run(None, "a.png", "image/png", noise_png(50, 50))
            .await
            .expect("pipeline");

        assert!(matches!(verdict, UploadVerdict::Accepted(_)));
    }

    #[tokio::test]
    async fn test_disallowed_declared_type_discarded() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 0).await;

        let verdict = pipeline
            .run(None, "doc.pdf", "application/pdf", b"%PDF-1.4 junk".to_vec())
            .await
            .expect("pipeline");

        match verdict {
            UploadVerdict::Discarded(reason) => {
                assert_eq!(reason, DiscardReason::DeclaredTypeNotAllowed)
            }
            other => panic!("Expected Discarded, got {:?}", other),
        }
        assert_eq!(dir_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_declared_type_parameters_ignored() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 0).await;

        let verdict = pipeline
            .run(None, "a.png", "IMAGE/PNG; charset=utf-8", noise_png(20, 20))
            .await
            .expect("pipeline");

        assert!(matches!(verdict, UploadVerdict::Accepted(_)));
    }

    #[tokio::test]
    async fn test_unrecognized_signature_discarded() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 0).await;

        let verdict = pipeline
            .run(None, "a.png", "image/png", b"just some plain text".to_vec())
            .await
            .expect("pipeline");

        match verdict {
            UploadVerdict::Discarded(reason) => {
                assert_eq!(reason, DiscardReason::UnrecognizedSignature)
            }
            other => panic!("Expected Discarded, got {:?}", other),
        }
        assert_eq!(dir_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_recognized_but_disallowed_signature_discarded() {
        let tmp = tempfile::tempdir().expect("tempdir");
        // Only PNG allowed; a GIF declared as PNG passes stage 2 and fails stage 4
        let pipeline = pipeline_over(tmp.path(), &["image/png"], 0).await;

        let verdict = pipeline
            .run(None, "a.png", "image/png", noise_gif(16, 16))
            .await
            .expect("pipeline");

        match verdict {
            UploadVerdict::Discarded(reason) => {
                assert_eq!(reason, DiscardReason::SignatureNotAllowed)
            }
            other => panic!("Expected Discarded, got {:?}", other),
        }
        assert_eq!(dir_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_corrupt_png_rejected() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 0).await;

        let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
        data.extend(std::iter::repeat(0xABu8).take(4096));

        let result = pipeline.run(None, "a.png", "image/png", data).await;

        match result {
            Err(AppError::InvalidImageContent(_)) => {}
            other => panic!("Expected InvalidImageContent, got {:?}", other),
        }
        assert_eq!(dir_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_valid_png_accepted_and_temp_removed() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 0).await;

        let data = noise_png(64, 48);
        let size = data.len() as u64;
        let verdict = pipeline
            .run(None, "photo.png", "image/png", data)
            .await
            .expect("pipeline");

        match verdict {
            UploadVerdict::Accepted(accepted) => {
                assert!(accepted.file_name.ends_with(".png"));
                assert_eq!(accepted.original_name, "photo.png");
                assert_eq!(accepted.content_type, "image/png");
                assert_eq!(accepted.detected_type, "image/png");
                assert_eq!(accepted.size_bytes, size);
                assert_eq!(accepted.width, 64);
                assert_eq!(accepted.height, 48);
            }
            other => panic!("Expected Accepted, got {:?}", other),
        }
        assert_eq!(dir_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_repeated_uploads_get_distinct_names() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 0).await;

        let mut names = Vec::new();
        for _ in 0..2 {
            let verdict = pipeline
                .run(None, "photo.png", "image/png", noise_png(20, 20))
                .await
                .expect("pipeline");
            match verdict {
                UploadVerdict::Accepted(accepted) => names.push(accepted.file_name),
                other => panic!("Expected Accepted, got {:?}", other),
            }
        }
        assert_ne!(names[0], names[1]);
    }

    #[tokio::test]
    async fn test_extension_corrected_to_match_signature() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 0).await;

        let verdict = pipeline
            .run(None, "payload.txt", "image/png", noise_png(12, 12))
            .await
            .expect("pipeline");

        match verdict {
            UploadVerdict::Accepted(accepted) => assert!(accepted.file_name.ends_with(".png")),
            other => panic!("Expected Accepted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_jpeg_alias_extension_kept() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 0).await;

        let verdict = pipeline
            .run(None, "shot.jpeg", "image/jpeg", noise_jpeg(24, 24))
            .await
            .expect("pipeline");

        match verdict {
            UploadVerdict::Accepted(accepted) => {
                assert!(accepted.file_name.ends_with(".jpeg"));
                assert_eq!(accepted.detected_type, "image/jpeg");
            }
            other => panic!("Expected Accepted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_svg_dimensions_extracted() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_over(tmp.path(), &ALLOWED, 0).await;

        let verdict = pipeline
            .run(None, "logo.svg", "image/svg+xml", svg_bytes())
            .await
            .expect("pipeline");

        match verdict {
            UploadVerdict::Accepted(accepted) => {
                assert!(accepted.file_name.ends_with(".svg"));
                assert_eq!(accepted.detected_type, "image/svg+xml");
                assert_eq!(accepted.width, 120);
                assert_eq!(accepted.height, 80);
            }
            other => panic!("Expected Accepted, got {:?}", other),
        }
        assert_eq!(dir_entries(tmp.path()), 0);
    }
}
