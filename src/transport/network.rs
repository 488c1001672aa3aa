//! # Network Transport
//!
//! Raw TCP printing. Most thermal printers with an Ethernet or Wi-Fi
//! interface accept ESC/POS on port 9100 and answer status queries on the
//! same connection.
//!
//! The connection is opened on first use and dropped after any I/O error;
//! the next call reconnects.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

use super::Transport;
use crate::error::PrinterError;

/// Raw printing port
pub const DEFAULT_PORT: u16 = 9100;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const PROBE_TIMEOUT: Duration = Duration::from_millis(500);
const READ_BUFFER: usize = 256;

/// Network printer transport (TCP)
#[derive(Debug)]
pub struct NetworkTransport {
    addr: SocketAddr,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl NetworkTransport {
    /// Create a transport for `host:port`
    pub fn new(host: &str, port: u16) -> Result<Self, PrinterError> {
        Self::from_addr(&format!("{}:{}", host, port))
    }

    /// Create from a socket address string (e.g., "192.168.1.100:9100").
    /// A bare IP gets the default port.
    pub fn from_addr(addr: &str) -> Result<Self, PrinterError> {
        let parsed: SocketAddr = match addr.parse() {
            Ok(a) => a,
            Err(_) => format!("{}:{}", addr, DEFAULT_PORT)
                .parse()
                .map_err(|_| PrinterError::InvalidArgument(format!("Invalid address: {}", addr)))?,
        };

        Ok(Self {
            addr: parsed,
            timeout: CONNECT_TIMEOUT,
            stream: None,
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn connect(&mut self, timeout: Duration) -> Result<&mut TcpStream, PrinterError> {
        if self.stream.is_none() {
            let stream = tokio::time::timeout(timeout, TcpStream::connect(self.addr))
                .await
                .map_err(|_| PrinterError::Transport(format!("Connection timeout: {}", self.addr)))?
                .map_err(|e| PrinterError::Transport(format!("{}: {}", self.addr, e)))?;
            info!(addr = %self.addr, "connected to printer");
            self.stream = Some(stream);
        }

        self.stream
            .as_mut()
            .ok_or_else(|| PrinterError::Transport(format!("not connected: {}", self.addr)))
    }
}

#[async_trait]
impl Transport for NetworkTransport {
    #[instrument(skip(self, data), fields(addr = %self.addr, data_len = data.len()))]
    async fn write_all(&mut self, data: &[u8]) -> Result<(), PrinterError> {
        let timeout = self.timeout;
        let stream = self.connect(timeout).await?;

        let mut result = stream.write_all(data).await;
        if result.is_ok() {
            result = stream.flush().await;
        }

        if let Err(e) = result {
            self.stream = None;
            return Err(PrinterError::Transport(format!("Write failed: {}", e)));
        }
        Ok(())
    }

    async fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, PrinterError> {
        let connect_timeout = self.timeout;
        let stream = self.connect(connect_timeout).await?;

        let mut buf = vec![0u8; READ_BUFFER];
        let result = tokio::time::timeout(timeout, stream.read(&mut buf)).await;
        match result {
            Ok(Ok(0)) => {
                warn!(addr = %self.addr, "printer closed the connection");
                self.stream = None;
                Ok(Vec::new())
            }
            Ok(Ok(n)) => {
                buf.truncate(n);
                Ok(buf)
            }
            Ok(Err(e)) => {
                self.stream = None;
                Err(PrinterError::Transport(format!("Read failed: {}", e)))
            }
            Err(_) => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self), fields(addr = %self.addr))]
    async fn is_online(&mut self) -> bool {
        if self.stream.is_some() {
            return true;
        }
        match self.connect(PROBE_TIMEOUT).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "printer offline");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_address_parsing() {
        let t = NetworkTransport::from_addr("192.168.1.50:9100").unwrap();
        assert_eq!(t.addr().port(), 9100);

        let t = NetworkTransport::from_addr("10.0.0.7").unwrap();
        assert_eq!(t.addr().port(), DEFAULT_PORT);

        let t = NetworkTransport::new("127.0.0.1", 9101).unwrap();
        assert_eq!(t.addr().port(), 9101);

        assert!(matches!(
            NetworkTransport::from_addr("not an address"),
            Err(PrinterError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_write_and_read_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 3];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(&[0x12]).await.unwrap();
            buf
        });

        let mut transport = NetworkTransport::from_addr(&addr.to_string()).unwrap();
        transport.write_all(&[0x10, 0x04, 0x01]).await.unwrap();
        let answer = transport.read(Duration::from_secs(2)).await.unwrap();

        assert_eq!(answer, vec![0x12]);
        assert_eq!(server.await.unwrap(), [0x10, 0x04, 0x01]);
    }

    #[tokio::test]
    async fn test_unreachable_is_offline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut transport = NetworkTransport::from_addr(&addr.to_string()).unwrap();
        assert!(!transport.is_online().await);
        assert!(transport.write_all(b"x").await.is_err());
    }
}
