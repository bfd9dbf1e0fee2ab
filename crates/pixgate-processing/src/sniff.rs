//! File type sniffing from stored bytes.
//!
//! Binary image formats are recognized by their magic bytes. SVG has no
//! binary signature, so a bounded text probe over the head of the file
//! looks for an `<svg` root element instead.

/// How many leading bytes the SVG text probe inspects.
const SVG_PROBE_WINDOW: usize = 1024;

/// Image types the sniffer can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Svg,
}

impl ImageKind {
    /// Canonical MIME type for this kind.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Svg => "image/svg+xml",
        }
    }

    /// Canonical file extension for this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Svg => "svg",
        }
    }

    /// Whether a normalized MIME string names this kind.
    /// JPEG accepts the nonstandard `image/jpg` alias alongside `image/jpeg`.
    pub fn matches_mime(&self, mime: &str) -> bool {
        match self {
            ImageKind::Jpeg => mime == "image/jpeg" || mime == "image/jpg",
            _ => mime == self.mime_type(),
        }
    }

    /// Whether a lowercase file extension is a valid spelling for this kind.
    pub fn matches_extension(&self, ext: &str) -> bool {
        match self {
            ImageKind::Jpeg => ext == "jpg" || ext == "jpeg",
            _ => ext == self.extension(),
        }
    }
}

/// Sniff the image type from file content.
///
/// Returns `None` when the bytes carry no recognized image signature and do
/// not look like an SVG document.
pub fn detect_image_kind(data: &[u8]) -> Option<ImageKind> {
    if let Some(kind) = infer::get(data) {
        return match kind.mime_type() {
            "image/png" => Some(ImageKind::Png),
            "image/jpeg" => Some(ImageKind::Jpeg),
            "image/gif" => Some(ImageKind::Gif),
            _ => None,
        };
    }

    if looks_like_svg(data) {
        return Some(ImageKind::Svg);
    }

    None
}

/// Bounded text probe for SVG documents: the head of the file must start
/// with an `<svg` element, optionally preceded by an XML prolog or doctype.
pub fn looks_like_svg(data: &[u8]) -> bool {
    let window = &data[..data.len().min(SVG_PROBE_WINDOW)];
    let text = String::from_utf8_lossy(window);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();

    if trimmed.starts_with("<svg") {
        return true;
    }

    (trimmed.starts_with("<?xml") || trimmed.starts_with("<!DOCTYPE"))
        && trimmed.contains("<svg")
}
