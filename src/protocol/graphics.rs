//! # ESC/POS Raster Graphics
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```

use super::commands::{GS, u16_le};

// ============================================================================
// RASTER BIT IMAGE (GS v 0)
// ============================================================================

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 m xL xH yL yH d1...dk |
///
/// ## Parameters
///
/// - `m`: Scaling mode (0 = normal density)
/// - `xL, xH`: Width in bytes, little-endian
/// - `yL, yH`: Height in dots, little-endian
/// - `d1...dk`: Image data, k = width_bytes × height
///
/// ## Example
///
/// ```
/// use sunmi_printer::protocol::graphics;
///
/// let data = vec![0xAA; 48 * 10];
/// let cmd = graphics::raster(384, 10, &data);
/// assert_eq!(&cmd[0..8], &[0x1D, 0x76, 0x30, 0x00, 48, 0, 10, 0]);
/// ```
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);

    debug_assert!(
        data.len() == width_bytes as usize * height as usize,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        width_bytes as usize * height as usize,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.extend_from_slice(&[GS, b'v', b'0', 0, xl, xh, yl, yh]);
    cmd.extend_from_slice(data);
    cmd
}

/// Split a packed image into several raster commands of at most
/// `max_rows` rows each.
///
/// Small printer receive buffers overflow on tall single commands; sending
/// chunks keeps each command within what the firmware accepts.
pub fn raster_chunked(width_dots: u16, height: u16, data: &[u8], max_rows: u16) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8) as usize;
    let max_rows = max_rows.max(1);

    let mut cmd = Vec::with_capacity(data.len() + 8 * (height / max_rows + 1) as usize);
    let mut row = 0u16;
    while row < height {
        let rows = (height - row).min(max_rows);
        let start = row as usize * width_bytes;
        let end = start + rows as usize * width_bytes;
        cmd.extend(raster(width_dots, rows, &data[start..end]));
        row += rows;
    }
    cmd
}

// ============================================================================
// TESTS
// ============================================================================
