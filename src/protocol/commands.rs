//! # ESC/POS Protocol Commands
//!
//! This module implements the basic ESC/POS commands understood by Sunmi
//! built-in printers and most other 58mm/80mm thermal receipt printers.
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - Multi-byte with parameters: `ESC d n`, `GS ( A pL pH n m`
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for graphics, barcodes, character size, and status queries.
pub const GS: u8 = 0x1D;

/// DLE (Data Link Escape) - Real-time command prefix
///
/// `DLE EOT n` is answered by the printer even while it is busy.
pub const DLE: u8 = 0x10;

/// EOT (End of Transmission) - Second byte of real-time status requests
pub const EOT: u8 = 0x04;

/// FS (File Separator) - Kanji / double-byte character command prefix
pub const FS: u8 = 0x1C;

/// LF (Line Feed) - Print and advance one line
pub const LF: u8 = 0x0A;

/// Largest line count a single `ESC d n` can feed
pub const MAX_FEED_PER_COMMAND: u32 = 255;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Resets the printer's logic to its power-on defaults. Data already sitting
/// in the receive buffer is not discarded, so jobs still in flight continue
/// after the reset.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// ## Example
///
/// ```
/// use sunmi_printer::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Enable Double-Byte Character Mode (FS &)
///
/// Required before sending GBK-encoded text to Chinese-market printers.
#[inline]
pub fn double_byte_mode_on() -> Vec<u8> {
    vec![FS, b'&']
}

// ============================================================================
// PAPER FEED COMMANDS
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the line buffer and feeds the paper by `n` lines. Jobs queued in
/// the receive buffer are not affected.
///
/// ## Protocol Details
///
/// | Format  | Bytes     |
/// |---------|-----------|
/// | ASCII   | ESC d n   |
/// | Hex     | 1B 64 n   |
/// | Decimal | 27 100 n  |
///
/// ## Example
///
/// ```
/// use sunmi_printer::protocol::commands;
///
/// assert_eq!(commands::feed_lines(3), vec![0x1B, 0x64, 3]);
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

/// Feed an arbitrary number of lines, splitting into several `ESC d n`
/// commands when `lines` exceeds 255.
pub fn feed_lines_long(lines: u32) -> Vec<u8> {
    let mut cmd = Vec::new();
    let mut remaining = lines;
    while remaining > 0 {
        let step = remaining.min(MAX_FEED_PER_COMMAND);
        cmd.extend(feed_lines(step as u8));
        remaining -= step;
    }
    cmd
}

// ============================================================================
// CUTTER CONTROL COMMANDS
// ============================================================================

/// Paper cut modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutMode {
    /// Cut completely through the paper
    #[default]
    Full = 0,
    /// Leave a small hinge connecting the receipt to the roll
    Partial = 1,
}

/// # Cut Paper (GS V m)
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V m   |
/// | Hex     | 1D 56 m  |
/// | Decimal | 29 86 m  |
///
/// - `m = 0`: Full cut
/// - `m = 1`: Partial cut
#[inline]
pub fn cut(mode: CutMode) -> Vec<u8> {
    vec![GS, b'V', mode as u8]
}

// ============================================================================
// STATUS AND IDENTIFICATION
// ============================================================================

/// Real-time status categories for `DLE EOT n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Printer status (drawer, online/offline)
    Printer = 1,
    /// Offline cause (cover, feed button, paper end stop, error)
    Offline = 2,
    /// Error cause (cutter, unrecoverable, auto-recoverable)
    Error = 3,
    /// Paper roll sensor
    Paper = 4,
}

/// # Transmit Real-Time Status (DLE EOT n)
///
/// The printer answers with a single status byte.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | Hex     | 10 04 n  |
#[inline]
pub fn transmit_status(kind: StatusKind) -> Vec<u8> {
    vec![DLE, EOT, kind as u8]
}

/// Printer information fields answered by `GS I n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    /// Firmware version (n = 65)
    FirmwareVersion = 65,
    /// Model name (n = 67)
    Model = 67,
    /// Serial number (n = 68)
    SerialNumber = 68,
}

/// # Transmit Printer ID (GS I n)
///
/// For `n` in 65..=69 the answer is framed as `_` (0x5F), the ASCII value,
/// and a terminating NUL.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | Hex     | 1D 49 n  |
#[inline]
pub fn transmit_id(field: InfoField) -> Vec<u8> {
    vec![GS, b'I', field as u8]
}

/// # Execute Self-Test Print (GS ( A pL pH n m)
///
/// Prints the firmware's self-test page (`m = 2`).
///
/// | Format  | Bytes                  |
/// |---------|------------------------|
/// | Hex     | 1D 28 41 02 00 00 02   |
#[inline]
pub fn self_test() -> Vec<u8> {
    vec![GS, b'(', b'A', 0x02, 0x00, 0x00, 0x02]
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ```
/// use sunmi_printer::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(384), [0x80, 0x01]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_feed_lines() {
        assert_eq!(feed_lines(0), vec![0x1B, 0x64, 0x00]);
        assert_eq!(feed_lines(5), vec![0x1B, 0x64, 0x05]);
    }

    #[test]
    fn test_feed_lines_long_splits() {
        assert_eq!(feed_lines_long(0), Vec::<u8>::new());
        assert_eq!(feed_lines_long(3), vec![0x1B, 0x64, 3]);
        assert_eq!(
            feed_lines_long(300),
            vec![0x1B, 0x64, 255, 0x1B, 0x64, 45]
        );
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut(CutMode::Full), vec![0x1D, 0x56, 0x00]);
        assert_eq!(cut(CutMode::Partial), vec![0x1D, 0x56, 0x01]);
    }

    #[test]
    fn test_status_and_id() {
        assert_eq!(transmit_status(StatusKind::Printer), vec![0x10, 0x04, 0x01]);
        assert_eq!(transmit_status(StatusKind::Paper), vec![0x10, 0x04, 0x04]);
        assert_eq!(transmit_id(InfoField::SerialNumber), vec![0x1D, 0x49, 68]);
        assert_eq!(transmit_id(InfoField::Model), vec![0x1D, 0x49, 67]);
    }

    #[test]
    fn test_self_test() {
        assert_eq!(self_test(), vec![0x1D, 0x28, 0x41, 0x02, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
        assert_eq!(u16_le(576), [0x40, 0x02]);
    }
}
