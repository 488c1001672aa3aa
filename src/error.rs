//! # Error Types
//!
//! This module defines the error type shared by the facade, the driver, and
//! the transports. Every failure surfaces to the caller through the
//! operation's `Result`; nothing is retried or swallowed at this layer.

use thiserror::Error;

/// Main error type for printer operations
#[derive(Debug, Error)]
pub enum PrinterError {
    /// No printer hardware is reachable
    #[error("Driver unavailable: {0}")]
    DriverUnavailable(String),

    /// Self-test or physical failure reported by the printer
    #[error("Hardware fault: {0}")]
    HardwareFault(String),

    /// The driver rejected the call or did not answer
    #[error("Driver error: {0}")]
    Driver(String),

    /// A raw-byte or QR payload could not be parsed
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Bitmap data is not a decodable image
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// Bitmap or symbol dimensions outside what the paper allows
    #[error("Dimension error: {0}")]
    Dimension(String),

    /// Barcode payload violates the symbology's length or charset rules
    #[error("Invalid payload for {symbology}: {reason}")]
    InvalidPayloadForSymbology {
        symbology: &'static str,
        reason: String,
    },

    /// Argument shape rejected before reaching the driver
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Font token not resident in the firmware
    #[error("Unsupported font: {0}")]
    UnsupportedFont(String),

    /// Transport-level errors (connection, write, read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for printer operations
pub type Result<T> = std::result::Result<T, PrinterError>;
