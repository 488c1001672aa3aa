//! # Sunmi Printer - Thermal Receipt Printer SDK
//!
//! A typed, async command surface for Sunmi V2 class receipt printers
//! (and other ESC/POS printers). It provides:
//!
//! - **Facade**: One operation per capability (text, columns, bitmap,
//!   barcode, QR, raw bytes, buffered printing, status)
//! - **Protocol implementation**: ESC/POS command builders
//! - **Layout**: Column text with wrap-on-overflow
//! - **Dithering**: Bayer 8x8 ordered dithering for bitmaps
//! - **Transport**: Device nodes, raw TCP, and an in-memory sink
//!
//! ## Quick Start
//!
//! ```no_run
//! use sunmi_printer::{
//!     printer::{Printer, PrinterConfig},
//!     protocol::barcode::qr::QrErrorLevel,
//!     protocol::text::Alignment,
//!     transport::NetworkTransport,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> sunmi_printer::Result<()> {
//! let transport = NetworkTransport::from_addr("192.168.1.50:9100")?;
//! let printer = Printer::escpos(transport, PrinterConfig::sunmi_v2());
//!
//! printer.initialize().await?;
//! printer.set_alignment(Alignment::Center).await?;
//! printer.print_text_with_font("CAFE\n", "gh", 48.0).await?;
//! printer
//!     .print_columns_text(
//!         &["Latte", "1", "4.50"],
//!         &[20, 4, 8],
//!         &[Alignment::Left, Alignment::Center, Alignment::Right],
//!     )
//!     .await?;
//! printer.print_qr_code("https://sunmi.com", 6, QrErrorLevel::M).await?;
//! printer.feed_lines(3).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`printer`] | Command facade and printer configurations |
//! | [`driver`] | Driver boundary and the ESC/POS driver |
//! | [`protocol`] | ESC/POS command builders |
//! | [`layout`] | Column layout and character widths |
//! | [`render`] | Bitmap decoding and dithering |
//! | [`transport`] | Communication backends |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Built for the Sunmi V2 (58mm paper, 203 DPI). The 80mm profile covers
//! the desktop models; other ESC/POS printers work with a matching
//! [`PrinterConfig`].

pub mod driver;
pub mod error;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use driver::{Driver, EscPosDriver};
pub use error::{PrinterError, Result};
pub use printer::{Printer, PrinterConfig};
pub use protocol::barcode::qr::QrErrorLevel;
pub use protocol::barcode::{BarcodeOptions, Symbology, TextPosition};
pub use protocol::commands::CutMode;
pub use protocol::text::{Alignment, FontName};
pub use transport::{DeviceTransport, MemoryTransport, NetworkTransport, Transport};
