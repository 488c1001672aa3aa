//! # Printer Driver Boundary
//!
//! [`Driver`] is everything the [`Printer`](crate::printer::Printer) facade
//! needs from the printer: one method per capability. The facade validates
//! argument shape and normalizes results; the driver owns the device state
//! (buffer mode, font selection, paper counters).
//!
//! ## Implementations
//!
//! - [`escpos`]: ESC/POS over any [`Transport`](crate::transport::Transport)

use async_trait::async_trait;

use crate::error::PrinterError;
use crate::protocol::barcode::qr::QrErrorLevel;
use crate::protocol::barcode::{BarcodeOptions, Symbology};
use crate::protocol::commands::{CutMode, InfoField};
use crate::protocol::text::{Alignment, FontName};

pub mod escpos;

pub use escpos::EscPosDriver;

/// Native printer driver
///
/// Calls made through one driver handle take effect in the order they are
/// awaited.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Base-font characters that fit on one printed line
    fn chars_per_line(&self) -> usize;

    /// Soft reset. Queued jobs and buffered content survive.
    async fn init(&self) -> Result<(), PrinterError>;

    /// Run the firmware self-test. `None` when the printer reports nothing.
    async fn self_test(&self) -> Result<Option<String>, PrinterError>;

    /// Ask the printer for an identification string
    async fn query_info(&self, field: InfoField) -> Result<String, PrinterError>;

    async fn has_printer(&self) -> Result<bool, PrinterError>;

    /// Bytes delivered to the print head so far
    async fn printed_length(&self) -> Result<u64, PrinterError>;

    async fn feed_lines(&self, lines: u32) -> Result<(), PrinterError>;

    async fn send_raw(&self, bytes: &[u8]) -> Result<(), PrinterError>;

    async fn cut(&self, mode: CutMode) -> Result<(), PrinterError>;

    async fn set_alignment(&self, alignment: Alignment) -> Result<(), PrinterError>;

    async fn set_font_name(&self, font: FontName) -> Result<(), PrinterError>;

    async fn set_font_size(&self, size: f32) -> Result<(), PrinterError>;

    async fn print_text(&self, text: &str) -> Result<(), PrinterError>;

    /// Print with a one-off font; the previous selection is restored after.
    async fn print_text_with_font(
        &self,
        text: &str,
        font: FontName,
        size: f32,
    ) -> Result<(), PrinterError>;

    /// Print an encoded image (PNG, JPEG, ...) scaled to `width`x`height` dots
    async fn print_bitmap(&self, image: &[u8], width: u32, height: u32)
    -> Result<(), PrinterError>;

    async fn print_barcode(
        &self,
        data: &str,
        symbology: Symbology,
        options: BarcodeOptions,
    ) -> Result<(), PrinterError>;

    async fn print_qr_code(
        &self,
        data: &str,
        module_size: u8,
        level: QrErrorLevel,
    ) -> Result<(), PrinterError>;

    /// Switch to buffer mode, discarding retained content when `clean`
    async fn enter_buffer(&self, clean: bool) -> Result<(), PrinterError>;

    /// Leave buffer mode. Returns `false` when `commit` was requested and the
    /// flush failed.
    async fn exit_buffer(&self, commit: bool) -> Result<bool, PrinterError>;

    /// Flush buffered content and stay in buffer mode
    async fn commit_buffer(&self) -> Result<String, PrinterError>;

    /// Discard buffered content
    async fn clear_buffer(&self) -> Result<String, PrinterError>;
}
