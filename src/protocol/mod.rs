//! # ESC/POS Protocol Implementation
//!
//! This module provides low-level command builders for the ESC/POS protocol
//! spoken by Sunmi built-in receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, feed, cut, status)
//! - [`text`]: Alignment, emphasis, font and size
//! - [`barcode`]: 1D barcodes and QR codes
//! - [`graphics`]: Raster bit images
//! - [`raw`]: Hex-token payloads for raw command injection
//!
//! ## Usage Example
//!
//! ```
//! use sunmi_printer::protocol::{commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align(text::Alignment::Center));
//! data.extend(text::bold_on());
//! data.extend(b"RECEIPT\n");
//! data.extend(text::bold_off());
//! data.extend(commands::feed_lines(3));
//! ```

pub mod barcode;
pub mod commands;
pub mod graphics;
pub mod raw;
pub mod text;
