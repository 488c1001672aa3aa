//! # Bitmap Rasterization
//!
//! Turns an encoded image (PNG, JPEG, GIF, BMP, WebP...) into packed
//! 1-bit rows ready for a `GS v 0` raster command.
//!
//! The image is resized to exactly the requested dimensions, converted to
//! grayscale intensity (transparent pixels count as white paper), and
//! dithered with the Bayer matrix.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;

use super::dither;
use crate::error::PrinterError;

/// A packed monochrome image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u16,
    pub height: u16,
    /// `ceil(width / 8) * height` bytes, MSB = leftmost dot
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Bytes per packed row
    pub fn width_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }
}

/// Decode a base64 image payload.
///
/// Accepts an optional `data:image/...;base64,` prefix and ignores embedded
/// whitespace and line breaks.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, PrinterError> {
    let body = match encoded.find(";base64,") {
        Some(pos) if encoded.starts_with("data:") => &encoded[pos + ";base64,".len()..],
        _ => encoded,
    };
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.is_empty() {
        return Err(PrinterError::UnsupportedImageFormat(
            "image payload is empty".to_string(),
        ));
    }

    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| PrinterError::UnsupportedImageFormat(format!("invalid base64: {}", e)))
}

/// Encode image bytes as plain base64 (no data-URL prefix)
pub fn encode_base64(image_bytes: &[u8]) -> String {
    STANDARD.encode(image_bytes)
}

/// Check requested output dimensions against the printable width.
pub fn check_dimensions(width: u32, height: u32, max_width: u16) -> Result<(), PrinterError> {
    if width == 0 || height == 0 {
        return Err(PrinterError::Dimension(format!(
            "bitmap size {}x{} must be non-zero",
            width, height
        )));
    }
    if width > max_width as u32 {
        return Err(PrinterError::Dimension(format!(
            "bitmap width {} exceeds printable width {}",
            width, max_width
        )));
    }
    if height > u16::MAX as u32 {
        return Err(PrinterError::Dimension(format!(
            "bitmap height {} exceeds {}",
            height,
            u16::MAX
        )));
    }
    Ok(())
}

/// Decode, resize and dither an encoded image.
pub fn rasterize(
    image_bytes: &[u8],
    width: u32,
    height: u32,
    max_width: u16,
) -> Result<Bitmap, PrinterError> {
    check_dimensions(width, height, max_width)?;

    let image = image::load_from_memory(image_bytes)
        .map_err(|e| PrinterError::UnsupportedImageFormat(e.to_string()))?;

    let resized = image.resize_exact(width, height, FilterType::Triangle);
    let rgba = resized.to_rgba8();

    let w = width as usize;
    let h = height as usize;
    let mut intensity = vec![0.0f32; w * h];
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        let alpha = a as f32 / 255.0;
        intensity[y as usize * w + x as usize] = (1.0 - luma / 255.0) * alpha;
    }

    let data = dither::generate_raster(w, h, |x, y| intensity[y * w + x]);

    Ok(Bitmap {
        width: width as u16,
        height: height as u16,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_decode_base64_variants() {
        assert_eq!(decode_base64("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_base64("aGVs\nbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_base64("data:image/png;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
        assert!(matches!(
            decode_base64("***"),
            Err(PrinterError::UnsupportedImageFormat(_))
        ));
        assert!(decode_base64("").is_err());
        assert_eq!(encode_base64(b"hello"), "aGVsbG8=");
    }

    #[test]
    fn test_dimension_checks() {
        assert!(check_dimensions(384, 10, 384).is_ok());
        assert!(matches!(
            check_dimensions(0, 10, 384),
            Err(PrinterError::Dimension(_))
        ));
        assert!(matches!(
            check_dimensions(385, 10, 384),
            Err(PrinterError::Dimension(_))
        ));
        assert!(check_dimensions(8, 70_000, 384).is_err());
    }

    #[test]
    fn test_rasterize_black_image() {
        let png = png_bytes(DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([0]))));
        let bitmap = rasterize(&png, 16, 3, 384).unwrap();
        assert_eq!(bitmap.width, 16);
        assert_eq!(bitmap.height, 3);
        assert_eq!(bitmap.width_bytes(), 2);
        assert_eq!(bitmap.data, vec![0xFF; 6]);
    }

    #[test]
    fn test_transparent_prints_white() {
        let png = png_bytes(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            8,
            8,
            Rgba([0, 0, 0, 0]),
        )));
        let bitmap = rasterize(&png, 8, 8, 384).unwrap();
        assert!(bitmap.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rejects_non_image() {
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>";
        assert!(matches!(
            rasterize(svg, 8, 8, 384),
            Err(PrinterError::UnsupportedImageFormat(_))
        ));
    }
}
