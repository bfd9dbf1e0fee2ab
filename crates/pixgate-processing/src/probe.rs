//! Image probe - decode validation and dimension extraction

use std::io::Cursor;

use image::{GenericImageView, ImageReader};

use crate::sniff::ImageKind;
use crate::svg;

#[derive(Debug, thiserror::Error)]
pub enum ImageProbeError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Could not determine image dimensions")]
    UnknownDimensions,

    #[error("Image dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

pub struct ImageProbe;

impl ImageProbe {
    /// Validate image content and return its dimensions.
    ///
    /// Binary formats are fully decoded; SVG is scanned for declared
    /// dimensions instead. Zero-area images are rejected.
    pub fn validate_and_get_dimensions(
        kind: ImageKind,
        data: &[u8],
    ) -> Result<(u32, u32), ImageProbeError> {
        let (width, height) = match kind {
            ImageKind::Svg => {
                svg::extract_dimensions(data).ok_or(ImageProbeError::UnknownDimensions)?
            }
            _ => Self::decode_dimensions(data)?,
        };

        if width == 0 || height == 0 {
            return Err(ImageProbeError::InvalidDimensions { width, height });
        }

        Ok((width, height))
    }

    fn decode_dimensions(data: &[u8]) -> Result<(u32, u32), ImageProbeError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ImageProbeError::Decode(e.to_string()))?;
        let img = reader
            .decode()
            .map_err(|e| ImageProbeError::Decode(e.to_string()))?;
        Ok(img.dimensions())
    }
}
