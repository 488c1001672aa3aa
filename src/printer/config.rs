//! # Printer Configuration
//!
//! Hardware specifications for supported receipt printers, plus the
//! driver tuning knobs.
//!
//! ## Supported Printers
//!
//! | Profile | Paper | Width (dots) | Chars/line |
//! |---------|-------|--------------|------------|
//! | `sunmi-v2` | 58mm | 384 | 32 |
//! | `sunmi-80mm` | 80mm | 576 | 48 |
//!
//! ## Usage
//!
//! ```
//! use sunmi_printer::printer::PrinterConfig;
//!
//! let config = PrinterConfig::sunmi_v2();
//! println!("Print width: {} dots ({} chars)", config.width_dots, config.chars_per_line);
//! ```
//!
//! A config can also be loaded from JSON; missing fields fall back to the
//! Sunmi V2 values:
//!
//! ```json
//! { "name": "Kitchen", "width_dots": 576, "chars_per_line": 48, "encoding": "utf8" }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use encoding_rs::GBK;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PrinterError;

// ============================================================================
// TEXT ENCODING
// ============================================================================

/// Character encoding the printer expects for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// UTF-8 pass-through
    Utf8,
    /// GBK double-byte mode (Sunmi factory setting)
    #[default]
    Gbk,
}

impl TextEncoding {
    /// Encode text for the wire. Characters GBK lacks become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Gbk => {
                let (bytes, _, had_errors) = GBK.encode(text);
                if !had_errors {
                    return bytes.into_owned();
                }
                warn!("text contains characters outside GBK, replacing them");
                text.chars()
                    .flat_map(|c| {
                        let mut buf = [0u8; 4];
                        let (encoded, _, bad) = GBK.encode(c.encode_utf8(&mut buf));
                        if bad { vec![b'?'] } else { encoded.into_owned() }
                    })
                    .collect()
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf8"),
            Self::Gbk => write!(f, "gbk"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = PrinterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "gbk" | "gb18030" => Ok(Self::Gbk),
            other => Err(PrinterError::InvalidArgument(format!(
                "unknown encoding '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// PRINTER CONFIGURATION
// ============================================================================

/// # Printer Configuration
///
/// ## Physical Properties
///
/// - **width_dots**: Maximum printable width in dots
/// - **chars_per_line**: Characters of the base font that fit on a line;
///   column rows may not be wider
///
/// ## Driver Tuning
///
/// - **max_chunk_rows**: Maximum rows per `GS v 0` raster command
/// - **response_timeout_ms**: How long to wait for status answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: String,

    /// Maximum print width in dots
    pub width_dots: u16,

    /// Base-font characters per line
    pub chars_per_line: u16,

    /// Text encoding on the wire
    pub encoding: TextEncoding,

    /// Font size selected after `initialize`
    pub default_font_size: f32,

    /// Maximum rows per raster chunk
    pub max_chunk_rows: u16,

    /// Status answer timeout (milliseconds)
    pub response_timeout_ms: u64,
}

impl PrinterConfig {
    /// Built-in profile names accepted by [`PrinterConfig::profile`]
    pub const PROFILES: [&'static str; 2] = ["sunmi-v2", "sunmi-80mm"];

    /// # Sunmi V2 Configuration
    ///
    /// Handheld 58mm thermal receipt printer.
    ///
    /// | Property | Value |
    /// |----------|-------|
    /// | Paper width | 58mm |
    /// | Print width | 48mm (384 dots) |
    /// | Characters | 32 per line (12x24 font) |
    pub fn sunmi_v2() -> Self {
        Self {
            name: "Sunmi V2".to_string(),
            width_dots: 384,
            chars_per_line: 32,
            encoding: TextEncoding::Gbk,
            default_font_size: 24.0,
            max_chunk_rows: 256,
            response_timeout_ms: 500,
        }
    }

    /// 80mm desktop variant (Sunmi T2 class)
    pub fn sunmi_80mm() -> Self {
        Self {
            name: "Sunmi 80mm".to_string(),
            width_dots: 576,
            chars_per_line: 48,
            ..Self::sunmi_v2()
        }
    }

    /// Look up a built-in profile by name.
    pub fn profile(name: &str) -> Result<Self, PrinterError> {
        match name.to_lowercase().as_str() {
            "sunmi-v2" | "v2" | "58mm" => Ok(Self::sunmi_v2()),
            "sunmi-80mm" | "80mm" => Ok(Self::sunmi_80mm()),
            other => Err(PrinterError::InvalidArgument(format!(
                "Unknown profile '{}'. Use one of: {}",
                other,
                Self::PROFILES.join(", ")
            ))),
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PrinterError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            PrinterError::InvalidArgument(format!("{}: {}", path.display(), e))
        })
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::sunmi_v2()
    }
}

// ============================================================================
// TESTS
// ============================================================================
