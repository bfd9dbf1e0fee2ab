//! SVG dimension extraction.
//!
//! The `image` crate cannot decode SVG, so dimensions are pulled from the
//! root element's `width`/`height` attributes, falling back to the `viewBox`.
//! Only the head of the document is scanned; unit suffixes are ignored.

use std::sync::OnceLock;

use regex::Regex;

/// How many leading bytes the dimension scan inspects.
const DIMENSION_PROBE_WINDOW: usize = 4096;

fn svg_open_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<svg\b[^>]*>").unwrap())
}

fn width_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Leading whitespace keeps attributes like stroke-width from matching
    RE.get_or_init(|| Regex::new(r#"(?i)\swidth\s*=\s*["']\s*([0-9]*\.?[0-9]+)"#).unwrap())
}

fn height_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)\sheight\s*=\s*["']\s*([0-9]*\.?[0-9]+)"#).unwrap())
}

fn view_box_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\sviewbox\s*=\s*["']\s*[-0-9.]+[\s,]+[-0-9.]+[\s,]+([0-9.]+)[\s,]+([0-9.]+)"#)
            .unwrap()
    })
}

/// Extract pixel dimensions from the root `<svg>` element.
///
/// Returns `None` when no `<svg>` tag is found in the probe window or the
/// tag carries neither usable `width`/`height` attributes nor a `viewBox`.
pub(crate) fn extract_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let window = &data[..data.len().min(DIMENSION_PROBE_WINDOW)];
    let text = String::from_utf8_lossy(window);
    let tag = svg_open_tag_regex().find(&text)?.as_str();

    let width = attr_value(width_regex(), tag);
    let height = attr_value(height_regex(), tag);
    if let (Some(width), Some(height)) = (width, height) {
        return to_pixel_pair(width, height);
    }

    let caps = view_box_regex().captures(tag)?;
    let width = caps.get(1)?.as_str().parse().ok()?;
    let height = caps.get(2)?.as_str().parse().ok()?;
    to_pixel_pair(width, height)
}

fn attr_value(re: &Regex, tag: &str) -> Option<f64> {
    re.captures(tag)?.get(1)?.as_str().parse().ok()
}

fn to_pixel_pair(width: f64, height: f64) -> Option<(u32, u32)> {
    if !width.is_finite() || !height.is_finite() {
        return None;
    }
    Some((width.round() as u32, height.round() as u32))
}
