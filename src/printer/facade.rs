//! # Printer Command Facade
//!
//! One async operation per printer capability. Each operation checks the
//! shape of its arguments, hands the work to the [`Driver`], and turns the
//! driver's answer into the declared result type.
//!
//! Operations issued through one `Printer` and awaited in sequence reach
//! the printer in that order. Nothing here retries; every failure comes
//! back through the operation's `Result`.
//!
//! ## Example
//!
//! ```
//! use sunmi_printer::printer::{Printer, PrinterConfig};
//! use sunmi_printer::protocol::text::Alignment;
//! use sunmi_printer::transport::MemoryTransport;
//!
//! # #[tokio::main]
//! # async fn main() -> sunmi_printer::Result<()> {
//! let sink = MemoryTransport::new();
//! let printer = Printer::escpos(sink.clone(), PrinterConfig::sunmi_v2());
//!
//! printer.initialize().await?;
//! printer.set_alignment(Alignment::Center).await?;
//! printer.print_string("Thank you!\n").await?;
//! printer.send_raw_bytes("0x1D, 0x56, 0x01").await?;
//!
//! assert!(sink.written().ends_with(&[0x1D, 0x56, 0x01]));
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use tracing::{debug, info, instrument};

use super::config::PrinterConfig;
use crate::driver::{Driver, EscPosDriver};
use crate::error::PrinterError;
use crate::layout;
use crate::protocol::barcode::qr::{self, QrErrorLevel};
use crate::protocol::barcode::{BarcodeOptions, Symbology};
use crate::protocol::commands::{CutMode, InfoField};
use crate::protocol::raw;
use crate::protocol::text::{Alignment, FontName};
use crate::render::bitmap;
use crate::transport::Transport;

/// Typed command surface over a printer driver
pub struct Printer<D: Driver> {
    driver: D,
}

impl<T: Transport> Printer<EscPosDriver<T>> {
    /// A printer speaking ESC/POS over `transport`
    pub fn escpos(transport: T, config: PrinterConfig) -> Self {
        Self::new(EscPosDriver::new(transport, config))
    }
}

impl<D: Driver> Printer<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    // ========================================================================
    // DEVICE
    // ========================================================================

    /// Soft-reset the printer. Queued jobs are not cleared.
    ///
    /// Fails with `DriverUnavailable` when no printer is reachable.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), PrinterError> {
        self.driver.init().await?;
        info!("printer initialized");
        Ok(())
    }

    /// Run the firmware self-test. `None` when the printer gives no report.
    #[instrument(skip(self))]
    pub async fn self_test(&self) -> Result<Option<String>, PrinterError> {
        self.driver.self_test().await
    }

    #[instrument(skip(self))]
    pub async fn serial_number(&self) -> Result<String, PrinterError> {
        self.driver.query_info(InfoField::SerialNumber).await
    }

    /// Firmware version
    #[instrument(skip(self))]
    pub async fn version(&self) -> Result<String, PrinterError> {
        self.driver.query_info(InfoField::FirmwareVersion).await
    }

    #[instrument(skip(self))]
    pub async fn model(&self) -> Result<String, PrinterError> {
        self.driver.query_info(InfoField::Model).await
    }

    /// Best-effort presence check
    #[instrument(skip(self))]
    pub async fn has_printer(&self) -> Result<bool, PrinterError> {
        self.driver.has_printer().await
    }

    /// Print output delivered so far, as a decimal string
    #[instrument(skip(self))]
    pub async fn printed_length(&self) -> Result<String, PrinterError> {
        Ok(self.driver.printed_length().await?.to_string())
    }

    // ========================================================================
    // PAPER AND RAW BYTES
    // ========================================================================

    /// Feed `lines` lines. Zero is a no-op.
    #[instrument(skip(self))]
    pub async fn feed_lines(&self, lines: u32) -> Result<(), PrinterError> {
        self.driver.feed_lines(lines).await
    }

    /// Forward a hex-token payload (`"0x1B, 0x45, 0x01"`) verbatim.
    ///
    /// Fails with `MalformedPayload` when a token is not one or two hex
    /// digits.
    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn send_raw_bytes(&self, payload: &str) -> Result<(), PrinterError> {
        let bytes = raw::parse_hex_tokens(payload)?;
        debug!(bytes = bytes.len(), "decoded raw payload");
        self.driver.send_raw(&bytes).await
    }

    #[instrument(skip(self))]
    pub async fn cut_paper(&self, mode: CutMode) -> Result<(), PrinterError> {
        self.driver.cut(mode).await
    }

    // ========================================================================
    // TEXT
    // ========================================================================

    /// Alignment for the text that follows
    #[instrument(skip(self))]
    pub async fn set_alignment(&self, alignment: Alignment) -> Result<(), PrinterError> {
        self.driver.set_alignment(alignment).await
    }

    /// Select a resident typeface by token (`"gh"`)
    #[instrument(skip(self))]
    pub async fn set_font_name(&self, typeface: &str) -> Result<(), PrinterError> {
        let font = FontName::from_str(typeface)?;
        self.driver.set_font_name(font).await
    }

    #[instrument(skip(self))]
    pub async fn set_font_size(&self, size: f32) -> Result<(), PrinterError> {
        check_font_size(size)?;
        self.driver.set_font_size(size).await
    }

    /// Print once with an explicit font; the current selection is kept.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn print_text_with_font(
        &self,
        text: &str,
        typeface: &str,
        size: f32,
    ) -> Result<(), PrinterError> {
        let font = FontName::from_str(typeface)?;
        check_font_size(size)?;
        self.driver.print_text_with_font(text, font, size).await
    }

    /// Print a row of up to three columns.
    ///
    /// `widths` are in character cells and together may not exceed the
    /// printer's line. Text wider than its column wraps onto further lines
    /// that restart at the column's first cell. All lines go to the driver in
    /// one call.
    #[instrument(skip(self, texts), fields(columns = texts.len()))]
    pub async fn print_columns_text<S: AsRef<str>>(
        &self,
        texts: &[S],
        widths: &[usize],
        aligns: &[Alignment; 3],
    ) -> Result<(), PrinterError> {
        let lines = layout::layout_columns(texts, widths, aligns)?;

        let total: usize = widths.iter().sum();
        let line_width = self.driver.chars_per_line();
        if total > line_width {
            return Err(PrinterError::InvalidArgument(format!(
                "column widths add up to {} cells, a line holds {}",
                total, line_width
            )));
        }
        debug!(lines = lines.len(), "laid out columns");

        let mut out = String::new();
        for line in &lines {
            out.push_str(line);
            out.push('\n');
        }
        self.driver.print_text(&out).await
    }

    /// Print text as-is
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn print_original_text(&self, text: &str) -> Result<(), PrinterError> {
        self.driver.print_text(text).await
    }

    /// Print text as-is
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn print_string(&self, text: &str) -> Result<(), PrinterError> {
        self.driver.print_text(text).await
    }

    // ========================================================================
    // GRAPHICS
    // ========================================================================

    /// Print a base64-encoded image scaled to `width`x`height` dots.
    #[instrument(skip(self, encoded), fields(encoded_len = encoded.len()))]
    pub async fn print_bitmap(
        &self,
        encoded: &str,
        width: u32,
        height: u32,
    ) -> Result<(), PrinterError> {
        let image = bitmap::decode_base64(encoded)?;
        self.driver.print_bitmap(&image, width, height).await
    }

    #[instrument(skip(self))]
    pub async fn print_barcode(
        &self,
        data: &str,
        symbology: Symbology,
        options: BarcodeOptions,
    ) -> Result<(), PrinterError> {
        options.validate()?;
        self.driver.print_barcode(data, symbology, options).await
    }

    /// Print a QR code. `module_size` is 1-16 dots.
    #[instrument(skip(self))]
    pub async fn print_qr_code(
        &self,
        data: &str,
        module_size: u8,
        level: QrErrorLevel,
    ) -> Result<(), PrinterError> {
        if !qr::MODULE_SIZE_RANGE.contains(&module_size) {
            return Err(PrinterError::InvalidArgument(format!(
                "QR module size {} (expected 1-16)",
                module_size
            )));
        }
        self.driver.print_qr_code(data, module_size, level).await
    }

    // ========================================================================
    // BUFFER
    // ========================================================================

    /// Start buffering print output. `clean` discards retained content first.
    #[instrument(skip(self))]
    pub async fn enter_printer_buffer(&self, clean: bool) -> Result<(), PrinterError> {
        self.driver.enter_buffer(clean).await
    }

    /// Stop buffering, printing the buffer when `commit` is set.
    ///
    /// Resolves once the flush has been attempted; `false` means the flush
    /// failed and the content is still held.
    #[instrument(skip(self))]
    pub async fn exit_printer_buffer(&self, commit: bool) -> Result<bool, PrinterError> {
        let flushed = self.driver.exit_buffer(commit).await?;
        if !flushed {
            info!("buffer flush failed");
        }
        Ok(flushed)
    }

    #[instrument(skip(self))]
    pub async fn commit_printer_buffer(&self) -> Result<String, PrinterError> {
        self.driver.commit_buffer().await
    }

    #[instrument(skip(self))]
    pub async fn clear_buffer(&self) -> Result<String, PrinterError> {
        self.driver.clear_buffer().await
    }
}

fn check_font_size(size: f32) -> Result<(), PrinterError> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(PrinterError::InvalidArgument(format!(
            "font size {} must be a positive number",
            size
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn printer() -> (Printer<EscPosDriver<MemoryTransport>>, MemoryTransport) {
        let sink = MemoryTransport::new();
        (Printer::escpos(sink.clone(), PrinterConfig::sunmi_v2()), sink)
    }

    #[test]
    fn test_check_font_size() {
        assert!(check_font_size(24.0).is_ok());
        assert!(check_font_size(0.5).is_ok());
        assert!(check_font_size(0.0).is_err());
        assert!(check_font_size(-3.0).is_err());
        assert!(check_font_size(f32::NAN).is_err());
        assert!(check_font_size(f32::INFINITY).is_err());
    }

    #[tokio::test]
    async fn test_unknown_font_rejected_before_driver() {
        let (p, sink) = printer();
        assert!(matches!(
            p.set_font_name("comic").await,
            Err(PrinterError::UnsupportedFont(_))
        ));
        assert!(matches!(
            p.print_text_with_font("x", "gh", 0.0).await,
            Err(PrinterError::InvalidArgument(_))
        ));
        assert!(sink.written().is_empty());
    }

    #[tokio::test]
    async fn test_barcode_geometry_checked() {
        let (p, sink) = printer();
        let options = BarcodeOptions::default().width(9);
        assert!(matches!(
            p.print_barcode("HELLO", Symbology::Code39, options).await,
            Err(PrinterError::InvalidArgument(_))
        ));
        assert!(sink.written().is_empty());
    }

    #[tokio::test]
    async fn test_printed_length_is_decimal() {
        let (p, _sink) = printer();
        p.print_string("12345").await.unwrap();
        assert_eq!(p.printed_length().await.unwrap(), "5");
    }
}
