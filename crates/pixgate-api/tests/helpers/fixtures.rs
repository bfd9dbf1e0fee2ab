//! Test fixtures: image blobs the pipeline can (and cannot) validate.

use std::io::Cursor;

use image::{Rgb, RgbImage, Rgba, RgbaImage};

/// Minimal valid 1x1 PNG bytes.
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Fully decodable PNG of the given dimensions. Per-pixel noise keeps the
/// encoder from collapsing the payload to a few bytes.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
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

/// Fully decodable JPEG of the given dimensions.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
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

/// Fully decodable GIF of the given dimensions.
pub fn create_test_gif(width: u32, height: u32) -> Vec<u8> {
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

/// SVG document with explicit pixel dimensions.
pub fn create_test_svg(width: u32, height: u32) -> Vec<u8> {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}"><rect width="{w}" height="{h}" fill="#09f"/></svg>"##,
        w = width,
        h = height
    )
    .into_bytes()
}

/// A real PNG signature followed by garbage: sniffs as PNG, fails decode.
pub fn create_corrupt_png(len: usize) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend(std::iter::repeat(0xABu8).take(len));
    data
}

/// Minimal PDF header, padded so tests can control the body size.
pub fn create_test_pdf(len: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    data.resize(data.len() + len, b' ');
    data.extend_from_slice(b"\n%%EOF");
    data
}
