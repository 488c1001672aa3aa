//! # Printer Transport Layer
//!
//! Byte sinks the ESC/POS driver writes to and reads status answers from.
//!
//! ## Available Transports
//!
//! - [`device`]: Character devices (`/dev/usb/lp0`, `/dev/rfcomm0`, serial TTYs)
//! - [`network`]: Raw TCP, usually port 9100
//! - [`memory`]: In-memory sink with scripted answers, for dry runs and tests

use std::time::Duration;

use async_trait::async_trait;

use crate::error::PrinterError;

pub mod device;
pub mod memory;
pub mod network;

pub use device::DeviceTransport;
pub use memory::MemoryTransport;
pub use network::NetworkTransport;

/// A bidirectional byte channel to a printer
#[async_trait]
pub trait Transport: Send {
    /// Deliver every byte of `data`, in order.
    async fn write_all(&mut self, data: &[u8]) -> Result<(), PrinterError>;

    /// Read whatever the printer answers within `timeout`.
    ///
    /// Returns an empty vector when nothing arrives in time. A zero `timeout`
    /// only returns bytes that have already arrived.
    async fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, PrinterError>;

    /// Whether the printer end is reachable right now
    async fn is_online(&mut self) -> bool;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), PrinterError> {
        (**self).write_all(data).await
    }

    async fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, PrinterError> {
        (**self).read(timeout).await
    }

    async fn is_online(&mut self) -> bool {
        (**self).is_online().await
    }
}
