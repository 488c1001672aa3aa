//! # In-Memory Transport
//!
//! Records every byte written and replays scripted status answers. Clones
//! share the same state, so a test can keep one handle for inspection while
//! the driver owns another.
//!
//! Scripted answers ([`MemoryTransport::push_response`]) are still on their
//! way: a zero-timeout read does not see them. Bytes already sitting in the
//! input ([`MemoryTransport::push_received`]) are returned by any read
//! first.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::Transport;
use crate::error::PrinterError;

#[derive(Debug, Default)]
struct State {
    written: Vec<u8>,
    responses: VecDeque<Vec<u8>>,
    received: VecDeque<Vec<u8>>,
    offline: bool,
    fail_writes: bool,
}

/// Shared in-memory printer endpoint
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    state: Arc<Mutex<State>>,
}

impl MemoryTransport {
    /// An online endpoint with no scripted answers
    pub fn new() -> Self {
        Self::default()
    }

    /// An endpoint that reports no printer attached
    pub fn offline() -> Self {
        let transport = Self::default();
        transport.lock().offline = true;
        transport
    }

    /// Queue an answer for the next `read`
    pub fn push_response(&self, bytes: impl Into<Vec<u8>>) {
        self.lock().responses.push_back(bytes.into());
    }

    /// Bytes that already arrived, e.g. an answer that came in late
    pub fn push_received(&self, bytes: impl Into<Vec<u8>>) {
        self.lock().received.push_back(bytes.into());
    }

    /// Everything written so far
    pub fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    /// Everything written so far, clearing the record
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.lock().written)
    }

    /// Make subsequent writes fail (simulates a dropped link)
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn set_online(&self, online: bool) {
        self.lock().offline = !online;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-write; the bytes are still valid.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), PrinterError> {
        let mut state = self.lock();
        if state.offline || state.fail_writes {
            return Err(PrinterError::Transport("write rejected by endpoint".to_string()));
        }
        state.written.extend_from_slice(data);
        Ok(())
    }

    async fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, PrinterError> {
        let mut state = self.lock();
        if let Some(bytes) = state.received.pop_front() {
            return Ok(bytes);
        }
        if timeout.is_zero() {
            return Ok(Vec::new());
        }
        Ok(state.responses.pop_front().unwrap_or_default())
    }

    async fn is_online(&mut self) -> bool {
        !self.lock().offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_state() {
        let handle = MemoryTransport::new();
        let mut sink = handle.clone();

        sink.write_all(&[1, 2]).await.unwrap();
        sink.write_all(&[3]).await.unwrap();
        assert_eq!(handle.written(), vec![1, 2, 3]);
        assert_eq!(handle.take_written(), vec![1, 2, 3]);
        assert!(handle.written().is_empty());
    }

    #[tokio::test]
    async fn test_scripted_responses() {
        let mut transport = MemoryTransport::new();
        transport.push_response(vec![0x12]);
        transport.push_response(b"_V2\0".to_vec());

        let timeout = Duration::from_millis(10);
        assert_eq!(transport.read(timeout).await.unwrap(), vec![0x12]);
        assert_eq!(transport.read(timeout).await.unwrap(), b"_V2\0".to_vec());
        assert!(transport.read(timeout).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_timeout_sees_only_received_bytes() {
        let mut transport = MemoryTransport::new();
        transport.push_response(vec![0x12]);
        transport.push_received(vec![0x16]);

        assert_eq!(transport.read(Duration::ZERO).await.unwrap(), vec![0x16]);
        assert!(transport.read(Duration::ZERO).await.unwrap().is_empty());
        assert_eq!(transport.read(Duration::from_millis(10)).await.unwrap(), vec![0x12]);
    }

    #[tokio::test]
    async fn test_offline_and_failing() {
        let mut transport = MemoryTransport::offline();
        assert!(!transport.is_online().await);
        assert!(transport.write_all(b"x").await.is_err());

        transport.set_online(true);
        assert!(transport.is_online().await);
        transport.set_fail_writes(true);
        assert!(transport.write_all(b"x").await.is_err());
        assert!(transport.written().is_empty());
    }
}
