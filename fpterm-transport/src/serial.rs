//! UART transport for directly wired modules
//!
//! `serialport` is blocking, so every read and write runs on tokio's
//! blocking pool while the port sits behind a mutex.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::Mutex;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, trace, warn};

use crate::{Transport, error::*, settle_read};

type SharedPort = Arc<Mutex<Box<dyn SerialPort>>>;

/// Serial transport, 8N1 without flow control
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    write_timeout: Duration,
    port: Option<SharedPort>,
}

impl SerialTransport {
    /// Create new serial transport
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            write_timeout: Duration::from_millis(1000),
            port: None,
        }
    }

    /// Set the time allowed for a frame to drain into the UART
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn shared_port(&self) -> Result<SharedPort> {
        self.port.clone().ok_or(Error::NotConnected)
    }
}

/// What the frame loops need from a port
trait FramePort: Read + Write {
    fn clear_input(&mut self) -> Result<()>;
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()>;
}

impl FramePort for Box<dyn SerialPort> {
    fn clear_input(&mut self) -> Result<()> {
        Ok(self.clear(ClearBuffer::Input)?)
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        Ok(self.set_timeout(timeout)?)
    }
}

/// Write until everything is accepted or the port stops taking bytes
fn write_frame<P: FramePort + ?Sized>(port: &mut P, data: &[u8]) -> Result<()> {
    // Anything still buffered belongs to an earlier, abandoned exchange
    port.clear_input()?;

    let mut written = 0;
    while written < data.len() {
        match port.write(&data[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }

    if written < data.len() {
        return Err(Error::WriteIncomplete {
            written,
            expected: data.len(),
        });
    }

    port.flush()?;
    Ok(())
}

/// Read up to `expected_len` bytes before `timeout` elapses
fn read_frame<P: FramePort + ?Sized>(
    port: &mut P,
    expected_len: usize,
    timeout: Duration,
) -> Result<BytesMut> {
    let deadline = Instant::now() + timeout;
    let mut buf = vec![0u8; expected_len];
    let mut filled = 0;

    while filled < expected_len {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        port.set_read_timeout(remaining)?;

        match port.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }

    buf.truncate(filled);
    Ok(BytesMut::from(&buf[..]))
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Opening {} at {} baud...", self.path, self.baud_rate);

        let port = serialport::new(&self.path, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.write_timeout)
            .open()?;

        debug!("Opened {}", self.path);

        self.port = Some(Arc::new(Mutex::new(port)));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            debug!("Closed {}", self.path);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.shared_port()?;
        let frame = data.to_vec();

        trace!("Sending {} bytes: {:02X?}", frame.len(), frame);

        tokio::task::spawn_blocking(move || write_frame(&mut *port.lock(), &frame)).await?
    }

    async fn receive(&mut self, expected_len: usize, timeout: Duration) -> Result<BytesMut> {
        let port = self.shared_port()?;

        let buf = tokio::task::spawn_blocking(move || {
            read_frame(&mut *port.lock(), expected_len, timeout)
        })
        .await??;

        trace!("Received {} bytes: {:02X?}", buf.len(), &buf[..]);
        if !buf.is_empty() && buf.len() < expected_len {
            warn!("Partial response: {}/{} bytes", buf.len(), expected_len);
        }

        settle_read(buf, expected_len, timeout)
    }

    fn endpoint(&self) -> String {
        self.path.clone()
    }
}
