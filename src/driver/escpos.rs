//! # ESC/POS Driver
//!
//! Drives a Sunmi-compatible ESC/POS printer over any [`Transport`].
//!
//! ## Buffer Mode
//!
//! ```text
//!            enter(clean)                 exit(commit = true)
//!  DIRECT ───────────────► BUFFERING ───────────────────────► DIRECT
//!    │                      │    ▲                              (flushed)
//!    │ print → transport    │    │ print → memory
//!    │                      └────┘
//!    │                      commit: flush, stay buffering
//!    │                      clear:  discard, stay buffering
//! ```
//!
//! - `enter(true)` discards whatever is retained; `enter(false)` keeps it.
//! - `exit(false)` discards the buffer without printing.
//! - A failed `exit(true)` flush leaves buffer mode but keeps the content,
//!   so `enter(false)` + `exit(true)` retries it.
//!
//! Status queries, `init` and the self-test always go straight to the
//! transport, even while buffering.
//!
//! ## Status Bytes (DLE EOT n)
//!
//! | n | Bit | Meaning |
//! |---|-----|---------|
//! | 1 | 1, 4 | Always 1 (bits 0, 7 always 0) |
//! | 1 | 3 | Offline |
//! | 2 | 2 | Cover open |
//! | 2 | 5 | Stopped by paper end |
//! | 3 | 3 | Autocutter error |
//! | 3 | 5 | Unrecoverable error |
//! | 3 | 6 | Auto-recoverable error (head temperature) |

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::Driver;
use crate::error::PrinterError;
use crate::printer::config::{PrinterConfig, TextEncoding};
use crate::protocol::barcode::qr::{self, QrErrorLevel};
use crate::protocol::barcode::{self, BarcodeOptions, Symbology};
use crate::protocol::commands::{self, CutMode, InfoField, StatusKind};
use crate::protocol::graphics;
use crate::protocol::text::{self, Alignment, FontName};
use crate::render::bitmap;
use crate::transport::Transport;

/// Fixed bits of every real-time status byte
const STATUS_FIXED_MASK: u8 = 0x93;
const STATUS_FIXED: u8 = 0x12;

const OFFLINE_COVER_OPEN: u8 = 0x04;
const OFFLINE_PAPER_END: u8 = 0x20;

const ERROR_AUTOCUTTER: u8 = 0x08;
const ERROR_UNRECOVERABLE: u8 = 0x20;
const ERROR_AUTO_RECOVERABLE: u8 = 0x40;

/// Reads attempted while waiting for a NUL-terminated info answer
const MAX_ANSWER_READS: usize = 4;

/// Reads spent discarding stale input before a query
const MAX_DRAIN_READS: usize = 16;

struct Inner<T> {
    transport: T,
    buffering: bool,
    buffer: Vec<u8>,
    font: FontName,
    font_size: f32,
    printed: u64,
}

impl<T: Transport> Inner<T> {
    /// Print output: buffered in buffer mode, delivered otherwise
    async fn emit(&mut self, bytes: &[u8]) -> Result<(), PrinterError> {
        if self.buffering {
            self.buffer.extend_from_slice(bytes);
            debug!(bytes = bytes.len(), buffered = self.buffer.len(), "buffered");
            return Ok(());
        }
        self.deliver(bytes).await
    }

    async fn deliver(&mut self, bytes: &[u8]) -> Result<(), PrinterError> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.transport.write_all(bytes).await?;
        self.printed += bytes.len() as u64;
        debug!(bytes = bytes.len(), "delivered");
        Ok(())
    }

    /// Send a command that is not print output
    async fn control(&mut self, bytes: &[u8]) -> Result<(), PrinterError> {
        self.transport.write_all(bytes).await
    }

    /// Discard input left over from an earlier query that gave up waiting.
    async fn drain_input(&mut self) -> Result<(), PrinterError> {
        for _ in 0..MAX_DRAIN_READS {
            let stale = self.transport.read(Duration::ZERO).await?;
            if stale.is_empty() {
                break;
            }
            warn!(bytes = stale.len(), "discarding late printer answer");
        }
        Ok(())
    }

    async fn status_byte(
        &mut self,
        kind: StatusKind,
        timeout: Duration,
    ) -> Result<Option<u8>, PrinterError> {
        self.drain_input().await?;
        self.control(&commands::transmit_status(kind)).await?;
        let answer = self.transport.read(timeout).await?;
        Ok(answer.first().copied())
    }

    async fn info_answer(
        &mut self,
        field: InfoField,
        timeout: Duration,
    ) -> Result<Vec<u8>, PrinterError> {
        self.drain_input().await?;
        self.control(&commands::transmit_id(field)).await?;
        let mut answer = Vec::new();
        for _ in 0..MAX_ANSWER_READS {
            let chunk = self.transport.read(timeout).await?;
            if chunk.is_empty() {
                break;
            }
            answer.extend(chunk);
            if answer.contains(&0) {
                break;
            }
        }
        Ok(answer)
    }
}

/// # ESC/POS Printer Driver
///
/// ## Example
///
/// ```no_run
/// use sunmi_printer::driver::{Driver, EscPosDriver};
/// use sunmi_printer::printer::PrinterConfig;
/// use sunmi_printer::transport::NetworkTransport;
///
/// # async fn run() -> sunmi_printer::Result<()> {
/// let transport = NetworkTransport::from_addr("192.168.1.50:9100")?;
/// let driver = EscPosDriver::new(transport, PrinterConfig::sunmi_v2());
/// driver.init().await?;
/// driver.print_text("Hello\n").await?;
/// # Ok(())
/// # }
/// ```
pub struct EscPosDriver<T: Transport> {
    config: PrinterConfig,
    inner: Mutex<Inner<T>>,
}

impl<T: Transport> EscPosDriver<T> {
    pub fn new(transport: T, config: PrinterConfig) -> Self {
        let font_size = config.default_font_size;
        Self {
            config,
            inner: Mutex::new(Inner {
                transport,
                buffering: false,
                buffer: Vec::new(),
                font: FontName::default(),
                font_size,
                printed: 0,
            }),
        }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Whether print output is currently being buffered
    pub async fn is_buffering(&self) -> bool {
        self.inner.lock().await.buffering
    }

    /// Bytes held in the buffer
    pub async fn buffered_len(&self) -> usize {
        self.inner.lock().await.buffer.len()
    }

    fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.config.response_timeout_ms)
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        self.config.encoding.encode(text)
    }
}

#[async_trait]
impl<T: Transport> Driver for EscPosDriver<T> {
    fn chars_per_line(&self) -> usize {
        self.config.chars_per_line as usize
    }

    async fn init(&self) -> Result<(), PrinterError> {
        let mut inner = self.inner.lock().await;
        if !inner.transport.is_online().await {
            return Err(PrinterError::DriverUnavailable(
                "no printer answering on the transport".to_string(),
            ));
        }

        let mut cmd = commands::init();
        if self.config.encoding == TextEncoding::Gbk {
            cmd.extend(commands::double_byte_mode_on());
        }
        if text::magnification_for(self.config.default_font_size) != 1 {
            cmd.extend(text::font_size(self.config.default_font_size));
        }
        inner.control(&cmd).await?;

        inner.font = FontName::default();
        inner.font_size = self.config.default_font_size;
        Ok(())
    }

    async fn self_test(&self) -> Result<Option<String>, PrinterError> {
        let timeout = self.response_timeout();
        let mut inner = self.inner.lock().await;
        if !inner.transport.is_online().await {
            return Err(PrinterError::DriverUnavailable(
                "no printer answering on the transport".to_string(),
            ));
        }

        inner.control(&commands::self_test()).await?;
        let offline = inner.status_byte(StatusKind::Offline, timeout).await?;
        let error = inner.status_byte(StatusKind::Error, timeout).await?;

        if offline.is_none() && error.is_none() {
            warn!("printer sent no status after self-test");
            return Ok(None);
        }
        let offline = offline.unwrap_or(STATUS_FIXED);
        let error = error.unwrap_or(STATUS_FIXED);

        let faults = self_test_faults(offline, error);
        if !faults.is_empty() {
            return Err(PrinterError::HardwareFault(faults.join(", ")));
        }
        Ok(Some(format!(
            "self-test ok (offline status 0x{:02X}, error status 0x{:02X})",
            offline, error
        )))
    }

    async fn query_info(&self, field: InfoField) -> Result<String, PrinterError> {
        let timeout = self.response_timeout();
        let answer = self.inner.lock().await.info_answer(field, timeout).await?;
        parse_info_answer(&answer).ok_or_else(|| {
            PrinterError::Driver(format!("printer did not answer the {:?} query", field))
        })
    }

    async fn has_printer(&self) -> Result<bool, PrinterError> {
        let timeout = self.response_timeout();
        let mut inner = self.inner.lock().await;
        if !inner.transport.is_online().await {
            return Ok(false);
        }

        match inner.status_byte(StatusKind::Printer, timeout).await? {
            None => {
                debug!("no status answer, trusting transport presence");
                Ok(true)
            }
            Some(status) if status & STATUS_FIXED_MASK == STATUS_FIXED => Ok(true),
            Some(status) => {
                warn!(status, "unexpected printer status byte");
                Ok(false)
            }
        }
    }

    async fn printed_length(&self) -> Result<u64, PrinterError> {
        Ok(self.inner.lock().await.printed)
    }

    async fn feed_lines(&self, lines: u32) -> Result<(), PrinterError> {
        self.inner
            .lock()
            .await
            .emit(&commands::feed_lines_long(lines))
            .await
    }

    async fn send_raw(&self, bytes: &[u8]) -> Result<(), PrinterError> {
        self.inner.lock().await.emit(bytes).await
    }

    async fn cut(&self, mode: CutMode) -> Result<(), PrinterError> {
        self.inner.lock().await.emit(&commands::cut(mode)).await
    }

    async fn set_alignment(&self, alignment: Alignment) -> Result<(), PrinterError> {
        self.inner.lock().await.emit(&text::align(alignment)).await
    }

    async fn set_font_name(&self, font: FontName) -> Result<(), PrinterError> {
        let mut inner = self.inner.lock().await;
        inner.emit(&text::select_font(font)).await?;
        inner.font = font;
        Ok(())
    }

    async fn set_font_size(&self, size: f32) -> Result<(), PrinterError> {
        let mut inner = self.inner.lock().await;
        inner.emit(&text::font_size(size)).await?;
        inner.font_size = size;
        Ok(())
    }

    async fn print_text(&self, text: &str) -> Result<(), PrinterError> {
        let bytes = self.encode(text);
        self.inner.lock().await.emit(&bytes).await
    }

    async fn print_text_with_font(
        &self,
        content: &str,
        font: FontName,
        size: f32,
    ) -> Result<(), PrinterError> {
        let mut inner = self.inner.lock().await;

        let mut cmd = text::select_font(font);
        cmd.extend(text::font_size(size));
        cmd.extend(self.encode(content));
        cmd.extend(text::select_font(inner.font));
        cmd.extend(text::font_size(inner.font_size));

        inner.emit(&cmd).await
    }

    #[instrument(skip(self, image), fields(image_len = image.len()))]
    async fn print_bitmap(
        &self,
        image: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), PrinterError> {
        let bitmap = bitmap::rasterize(image, width, height, self.config.width_dots)?;
        let cmd = graphics::raster_chunked(
            bitmap.width,
            bitmap.height,
            &bitmap.data,
            self.config.max_chunk_rows,
        );
        self.inner.lock().await.emit(&cmd).await
    }

    async fn print_barcode(
        &self,
        data: &str,
        symbology: Symbology,
        options: BarcodeOptions,
    ) -> Result<(), PrinterError> {
        let cmd = barcode::barcode(data, symbology, options)?;
        self.inner.lock().await.emit(&cmd).await
    }

    async fn print_qr_code(
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

        let footprint = qr::footprint_dots(data.as_bytes(), module_size, level)?;
        if footprint > self.config.width_dots as usize {
            return Err(PrinterError::Dimension(format!(
                "QR symbol is {} dots wide, paper holds {}",
                footprint, self.config.width_dots
            )));
        }

        let cmd = qr::generate(data.as_bytes(), module_size, level);
        self.inner.lock().await.emit(&cmd).await
    }

    async fn enter_buffer(&self, clean: bool) -> Result<(), PrinterError> {
        let mut inner = self.inner.lock().await;
        if clean && !inner.buffer.is_empty() {
            debug!(discarded = inner.buffer.len(), "cleaned buffer on enter");
            inner.buffer.clear();
        }
        inner.buffering = true;
        Ok(())
    }

    async fn exit_buffer(&self, commit: bool) -> Result<bool, PrinterError> {
        let mut inner = self.inner.lock().await;
        inner.buffering = false;

        if !commit {
            debug!(discarded = inner.buffer.len(), "left buffer mode without printing");
            inner.buffer.clear();
            return Ok(true);
        }

        let pending = std::mem::take(&mut inner.buffer);
        match inner.deliver(&pending).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(error = %e, bytes = pending.len(), "buffer flush failed, content kept");
                inner.buffer = pending;
                Ok(false)
            }
        }
    }

    async fn commit_buffer(&self) -> Result<String, PrinterError> {
        let mut inner = self.inner.lock().await;
        let pending = std::mem::take(&mut inner.buffer);
        if let Err(e) = inner.deliver(&pending).await {
            inner.buffer = pending;
            return Err(e);
        }
        Ok(format!("committed {} bytes", pending.len()))
    }

    async fn clear_buffer(&self) -> Result<String, PrinterError> {
        let mut inner = self.inner.lock().await;
        let cleared = inner.buffer.len();
        inner.buffer.clear();
        Ok(format!("cleared {} bytes", cleared))
    }
}

/// Extract the ASCII value of a `GS I` answer (`_` value NUL)
fn parse_info_answer(answer: &[u8]) -> Option<String> {
    let body = answer.strip_prefix(b"_").unwrap_or(answer);
    let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
    let value = String::from_utf8_lossy(&body[..end]).trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn self_test_faults(offline: u8, error: u8) -> Vec<&'static str> {
    let mut faults = Vec::new();
    if offline & OFFLINE_COVER_OPEN != 0 {
        faults.push("cover open");
    }
    if offline & OFFLINE_PAPER_END != 0 {
        faults.push("paper end");
    }
    if error & ERROR_AUTOCUTTER != 0 {
        faults.push("autocutter error");
    }
    if error & ERROR_UNRECOVERABLE != 0 {
        faults.push("unrecoverable error");
    }
    if error & ERROR_AUTO_RECOVERABLE != 0 {
        faults.push("head overheated");
    }
    faults
}

// ============================================================================
// TESTS
// ============================================================================
