//! # Bayer 8x8 Ordered Dithering
//!
//! Converts grayscale intensities into the black/white dots a thermal head
//! can print. For each pixel `(x, y)`:
//!
//! 1. Look up a threshold from the matrix using `(x mod 8, y mod 8)`
//! 2. Print a dot when the pixel's intensity exceeds the threshold
//!
//! Intensity is 0.0 for white paper and 1.0 for a fully black dot.
//!
//! ```
//! use sunmi_printer::render::dither;
//!
//! let row = vec![true, true, false, false, true, false, true, false];
//! assert_eq!(dither::pack_row(&row), vec![0b11001010]);
//! ```

/// Bayer 8x8 dithering matrix (values 0-63)
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Dithering threshold for a pixel position, always strictly inside (0, 1)
/// so pure black always prints and pure white never does.
#[inline]
pub fn threshold(x: usize, y: usize) -> f32 {
    let matrix_value = BAYER8[y & 7][x & 7];
    (matrix_value as f32 + 0.5) / 64.0
}

/// Whether a dot is printed at `(x, y)` for the given intensity
#[inline]
pub fn should_print(x: usize, y: usize, intensity: f32) -> bool {
    intensity > threshold(x, y)
}

/// Pack a row of pixels (true = black) into MSB-first bytes, padding the
/// last byte with white.
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }

    bytes
}

/// Generate a dithered, packed raster from an intensity function.
///
/// Output length is `ceil(width / 8) * height` bytes.
pub fn generate_raster<F>(width: usize, height: usize, intensity_fn: F) -> Vec<u8>
where
    F: Fn(usize, usize) -> f32,
{
    let mut data = Vec::with_capacity(width.div_ceil(8) * height);
    let mut row_pixels = Vec::with_capacity(width);

    for y in 0..height {
        row_pixels.clear();
        row_pixels.extend((0..width).map(|x| should_print(x, y, intensity_fn(x, y))));
        data.extend(pack_row(&row_pixels));
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bayer_matrix_values() {
        let mut seen = [false; 64];
        for row in &BAYER8 {
            for &val in row {
                assert!(val < 64, "Matrix value {} out of range", val);
                assert!(!seen[val as usize], "Duplicate value {}", val);
                seen[val as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_extremes() {
        for y in 0..16 {
            for x in 0..16 {
                assert!(should_print(x, y, 1.0));
                assert!(!should_print(x, y, 0.0));
            }
        }
    }

    #[test]
    fn test_gray_distribution() {
        let count = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| should_print(x, y, 0.5))
            .count();
        assert_eq!(count, 32);
    }

    #[test]
    fn test_pack_row() {
        assert_eq!(pack_row(&[true; 8]), vec![0xFF]);
        assert_eq!(pack_row(&[false; 8]), vec![0x00]);
        assert_eq!(
            pack_row(&[true, false, true, false, true, false, true, false]),
            vec![0xAA]
        );
        assert_eq!(pack_row(&[true; 9]), vec![0xFF, 0x80]);
        assert_eq!(pack_row(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_generate_raster() {
        let black = generate_raster(16, 2, |_, _| 1.0);
        assert_eq!(black, vec![0xFF; 4]);

        let white = generate_raster(10, 3, |_, _| 0.0);
        assert_eq!(white, vec![0x00; 6]);
    }
}
