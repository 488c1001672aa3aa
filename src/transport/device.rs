//! # Character Device Transport
//!
//! Talks to a printer exposed as a device node: the USB printer class
//! (`/dev/usb/lp0`), a Bluetooth SPP binding (`/dev/rfcomm0`), or a serial
//! port.
//!
//! ## Bluetooth Setup (Linux)
//!
//! ```bash
//! $ bluetoothctl
//! [bluetooth]# pair 00:11:22:XX:XX:XX
//! $ sudo rfcomm bind 0 00:11:22:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! ## TTY Configuration
//!
//! When the node is a TTY it is switched to raw mode so binary data is
//! transmitted without modification:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, CR/NL mapping
//! - **No software flow control**: IXON, IXOFF, IXANY (0x11/0x13 occur in raster data)
//! - **No output processing**: OPOST
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**: ICANON, ECHO, ECHONL, ISIG, IEXTEN off
//! - **Raw reads**: VMIN = 0, VTIME = 0
//!
//! ## Reads
//!
//! Device nodes are opened `O_NONBLOCK` and driven through the runtime's
//! reactor, so a read that times out leaves nothing pending and later writes
//! go straight through. Regular files (useful as a capture sink) cannot be
//! polled and use plain async file I/O.
//!
//! ## Chunked Writes
//!
//! Large writes go out in 4096-byte chunks with a short pause between them
//! so small receive buffers keep up.

use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::unix::AsyncFd;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, instrument, warn};

use super::Transport;
use crate::error::PrinterError;

/// Default device path (USB printer class)
pub const DEFAULT_DEVICE: &str = "/dev/usb/lp0";

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// Largest status answer we expect in one read
const READ_BUFFER: usize = 256;

/// # Device Printer Transport
///
/// ## Example
///
/// ```no_run
/// use sunmi_printer::protocol::commands;
/// use sunmi_printer::transport::{DeviceTransport, Transport};
///
/// # async fn run() -> sunmi_printer::Result<()> {
/// let mut transport = DeviceTransport::open("/dev/usb/lp0")?;
/// transport.write_all(&commands::init()).await?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceTransport {
    path: PathBuf,
    handle: Handle,
    chunk_size: usize,
    chunk_delay: Duration,
}

enum Handle {
    /// Character device, TTY or FIFO, registered with the reactor
    Polled(AsyncFd<std::fs::File>),
    /// Regular file
    Plain(tokio::fs::File),
}

impl DeviceTransport {
    /// Open a device node for reading and writing.
    ///
    /// ## Errors
    ///
    /// Returns a transport error if:
    /// - The device doesn't exist
    /// - Permission denied (may need root or the lp/dialout group)
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, PrinterError> {
        let path = device.as_ref();
        let open_error =
            |e: io::Error| PrinterError::Transport(format!("Failed to open {}: {}", path.display(), e));

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(open_error)?;

        let fd = file.as_raw_fd();
        if unsafe { libc::isatty(fd) } == 1 {
            configure_tty_raw(fd)?;
            debug!(device = %path.display(), "configured TTY raw mode");
        }

        let handle = if file.metadata().map_err(open_error)?.is_file() {
            Handle::Plain(tokio::fs::File::from_std(file))
        } else {
            Handle::Polled(AsyncFd::new(file).map_err(open_error)?)
        };

        Ok(Self {
            path: path.to_path_buf(),
            handle,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    /// Open the default device path (`/dev/usb/lp0`)
    pub fn open_default() -> Result<Self, PrinterError> {
        Self::open(DEFAULT_DEVICE)
    }

    /// Set the chunk size for large writes. Default is 4096 bytes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Set the delay between chunks. Default is 2ms.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), PrinterError> {
        let result = match &mut self.handle {
            Handle::Polled(fd) => write_polled(fd, chunk).await,
            Handle::Plain(file) => file.write_all(chunk).await,
        };
        result.map_err(|e| PrinterError::Transport(format!("Write failed: {}", e)))
    }
}

/// Write every byte, waiting for the reactor whenever the node is full.
async fn write_polled(fd: &AsyncFd<std::fs::File>, mut data: &[u8]) -> io::Result<()> {
    while !data.is_empty() {
        let mut guard = fd.writable().await?;
        let written = match guard.try_io(|inner| {
            let mut file: &std::fs::File = inner.get_ref();
            file.write(data)
        }) {
            Ok(result) => result?,
            Err(_would_block) => continue,
        };
        if written == 0 {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "device accepted no bytes"));
        }
        data = &data[written..];
    }
    Ok(())
}

/// One nonblocking read; `None` when nothing is waiting.
fn read_now(file: &std::fs::File, buf: &mut [u8]) -> io::Result<Option<usize>> {
    let mut file = file;
    match file.read(buf) {
        Ok(n) => Ok(Some(n)),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read from a polled node, giving up after `timeout`.
async fn read_polled(
    fd: &AsyncFd<std::fs::File>,
    buf: &mut [u8],
    timeout: Duration,
) -> io::Result<usize> {
    if let Some(n) = read_now(fd.get_ref(), buf)? {
        return Ok(n);
    }
    match tokio::time::timeout(timeout, read_when_ready(fd, buf)).await {
        Ok(result) => result,
        Err(_) => Ok(0),
    }
}

async fn read_when_ready(fd: &AsyncFd<std::fs::File>, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        let mut guard = fd.readable().await?;
        // WouldBlock must reach try_io so it clears the stale readiness
        match guard.try_io(|inner| {
            let mut file: &std::fs::File = inner.get_ref();
            file.read(buf)
        }) {
            Ok(result) => return result,
            Err(_would_block) => continue,
        }
    }
}

#[async_trait]
impl Transport for DeviceTransport {
    #[instrument(skip(self, data), fields(device = %self.path.display(), data_len = data.len()))]
    async fn write_all(&mut self, data: &[u8]) -> Result<(), PrinterError> {
        if data.len() <= self.chunk_size {
            self.write_chunk(data).await?;
        } else {
            let chunk_size = self.chunk_size;
            for chunk in data.chunks(chunk_size) {
                self.write_chunk(chunk).await?;
                if !self.chunk_delay.is_zero() {
                    tokio::time::sleep(self.chunk_delay).await;
                }
            }
        }

        if let Handle::Plain(file) = &mut self.handle {
            file.flush()
                .await
                .map_err(|e| PrinterError::Transport(format!("Flush failed: {}", e)))?;
        }
        Ok(())
    }

    async fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, PrinterError> {
        let mut buf = vec![0u8; READ_BUFFER];
        let result = match &mut self.handle {
            Handle::Polled(fd) => read_polled(fd, &mut buf, timeout).await,
            // Regular files never block
            Handle::Plain(file) => file.read(&mut buf).await,
        };
        let n = result.map_err(|e| PrinterError::Transport(format!("Read failed: {}", e)))?;
        buf.truncate(n);
        Ok(buf)
    }

    async fn is_online(&mut self) -> bool {
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => true,
            Err(e) => {
                warn!(device = %self.path.display(), error = %e, "device not reachable");
                false
            }
        }
    }
}

/// Configure a file descriptor for raw TTY mode.
fn configure_tty_raw(fd: i32) -> Result<(), PrinterError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(PrinterError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    // Status answers are a few bytes; return whatever has arrived.
    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 0;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(PrinterError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device_path() {
        assert_eq!(DEFAULT_DEVICE, "/dev/usb/lp0");
    }

    #[test]
    fn test_open_missing_device() {
        let err = DeviceTransport::open("/nonexistent/lp9").err().unwrap();
        assert!(matches!(err, PrinterError::Transport(_)));
        assert!(err.to_string().contains("/nonexistent/lp9"));
    }

    #[tokio::test]
    async fn test_regular_file_as_sink() {
        let path = std::env::temp_dir().join(format!("sunmi-device-{}.bin", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        let mut transport = DeviceTransport::open(&path).unwrap();
        transport.set_chunk_size(3);
        transport.set_chunk_delay(Duration::ZERO);
        transport.write_all(&[1, 2, 3, 4, 5, 6, 7]).await.unwrap();
        assert!(transport.is_online().await);

        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4, 5, 6, 7]);
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_write_after_timed_out_read() {
        use std::os::unix::ffi::OsStrExt;

        let path = std::env::temp_dir().join(format!("sunmi-fifo-{}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let c_path = std::ffi::CString::new(path.as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) }, 0);

        let mut transport = DeviceTransport::open(&path).unwrap();
        assert!(transport.read(Duration::from_millis(100)).await.unwrap().is_empty());

        let write =
            tokio::time::timeout(Duration::from_secs(3), transport.write_all(&[0x1B, 0x40])).await;
        assert!(write.is_ok(), "write stalled behind the timed-out read");
        write.unwrap().unwrap();

        // A FIFO opened read-write hands our own bytes back
        let echoed = transport.read(Duration::from_millis(500)).await.unwrap();
        assert_eq!(echoed, vec![0x1B, 0x40]);
        assert!(transport.read(Duration::ZERO).await.unwrap().is_empty());

        std::fs::remove_file(&path).unwrap();
    }
}
