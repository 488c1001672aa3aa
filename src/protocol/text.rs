//! # ESC/POS Text Styling Commands
//!
//! ## Text Styling Overview
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Alignment | ESC a n | Left / center / right |
//! | Bold | ESC E n | **Emphasized** text |
//! | Underline | ESC - n | Underlined text |
//! | Font | ESC M n | Resident typeface |
//! | Size | GS ! n | 1x..8x width and height |
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::commands::{ESC, GS};
use crate::error::PrinterError;

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
///
/// The discriminants are the wire codes the driver expects and must not be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

impl TryFrom<u8> for Alignment {
    type Error = PrinterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Left),
            1 => Ok(Self::Center),
            2 => Ok(Self::Right),
            other => Err(PrinterError::InvalidArgument(format!(
                "alignment code {} (expected 0, 1 or 2)",
                other
            ))),
        }
    }
}

impl FromStr for Alignment {
    type Err = PrinterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "0" => Ok(Self::Left),
            "center" | "centre" | "1" => Ok(Self::Center),
            "right" | "2" => Ok(Self::Right),
            _ => Err(PrinterError::InvalidArgument(format!(
                "unknown alignment '{}'",
                s
            ))),
        }
    }
}

/// # Select Justification (ESC a n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC a n |
/// | Hex     | 1B 61 n |
/// | Decimal | 27 97 n |
///
/// ## Behavior
///
/// - Affects all subsequent lines until changed
/// - Only takes effect at the beginning of a line
///
/// ## Example
///
/// ```
/// use sunmi_printer::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// EMPHASIS
// ============================================================================

/// # Turn Emphasized Mode On (ESC E 1)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | Hex     | 1B 45 01 |
#[inline]
pub fn bold_on() -> Vec<u8> {
    vec![ESC, b'E', 1]
}

/// Turn emphasized mode off (ESC E 0)
#[inline]
pub fn bold_off() -> Vec<u8> {
    vec![ESC, b'E', 0]
}

/// # Turn Underline Mode On (ESC - 1)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | Hex     | 1B 2D 01 |
#[inline]
pub fn underline_on() -> Vec<u8> {
    vec![ESC, b'-', 1]
}

/// Turn underline mode off (ESC - 0)
#[inline]
pub fn underline_off() -> Vec<u8> {
    vec![ESC, b'-', 0]
}

// ============================================================================
// FONT SELECTION
// ============================================================================

/// Typefaces resident in the printer firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontName {
    /// The built-in vector face, selected with the token `"gh"`
    #[default]
    #[serde(rename = "gh")]
    Gh,
}

impl FontName {
    /// The token callers use to name this face
    pub fn token(&self) -> &'static str {
        match self {
            Self::Gh => "gh",
        }
    }
}

impl fmt::Display for FontName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for FontName {
    type Err = PrinterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gh" => Ok(Self::Gh),
            other => Err(PrinterError::UnsupportedFont(other.to_string())),
        }
    }
}

/// # Select Character Font (ESC M n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | Hex     | 1B 4D n  |
///
/// The `gh` face is the printer's font A (`n = 0`).
pub fn select_font(font: FontName) -> Vec<u8> {
    let n = match font {
        FontName::Gh => 0,
    };
    vec![ESC, b'M', n]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// Vector font size that corresponds to 1x magnification
pub const BASE_FONT_SIZE: f32 = 24.0;

/// # Select Character Size (GS ! n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS ! n |
/// | Hex     | 1D 21 n |
///
/// Bits 4-7 of `n` hold the width multiplier minus one, bits 0-3 the height
/// multiplier minus one. Multipliers are clamped to 1..=8.
///
/// ## Example
///
/// ```
/// use sunmi_printer::protocol::text::char_size;
///
/// assert_eq!(char_size(1, 1), vec![0x1D, 0x21, 0x00]);
/// assert_eq!(char_size(2, 2), vec![0x1D, 0x21, 0x11]);
/// ```
pub fn char_size(width_mult: u8, height_mult: u8) -> Vec<u8> {
    let w = width_mult.clamp(1, 8) - 1;
    let h = height_mult.clamp(1, 8) - 1;
    vec![GS, b'!', (w << 4) | h]
}

/// Map a vector font size onto the printer's integer magnification.
///
/// 24 is the native size; anything that rounds below 1x prints at 1x.
///
/// ```
/// use sunmi_printer::protocol::text::magnification_for;
///
/// assert_eq!(magnification_for(24.0), 1);
/// assert_eq!(magnification_for(48.0), 2);
/// assert_eq!(magnification_for(500.0), 8);
/// ```
pub fn magnification_for(size: f32) -> u8 {
    (size / BASE_FONT_SIZE).round().clamp(1.0, 8.0) as u8
}

/// Character size command for a vector font size
pub fn font_size(size: f32) -> Vec<u8> {
    let mult = magnification_for(size);
    char_size(mult, mult)
}

// ============================================================================
// TESTS
// ============================================================================
