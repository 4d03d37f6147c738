//! TCP transport for modules behind a network serial bridge

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, trace, warn};

use crate::{Transport, error::*, settle_read};

/// TCP transport for AS608 modules
///
/// Talks to a raw TCP serial bridge (ser2net and similar) that forwards
/// bytes to the module's UART unchanged.
pub struct TcpTransport {
    addr: String,
    port: u16,
    socket_addr: Option<SocketAddr>,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            socket_addr: None,
            stream: None,
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Resolve address to SocketAddr
    async fn resolve_addr(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.socket_addr {
            return Ok(addr);
        }

        let addr_str = format!("{}:{}", self.addr, self.port);

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?
            .collect();

        let addr = addrs
            .first()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))?;

        self.socket_addr = Some(*addr);
        Ok(*addr)
    }
}

/// Throw away bytes that arrived after an earlier exchange gave up
///
/// A late or cut-off reply would otherwise be read as the answer to the
/// next command.
fn discard_stale(stream: &TcpStream) -> Result<()> {
    let mut scratch = [0u8; 64];
    let mut discarded = 0;

    loop {
        match stream.try_read(&mut scratch) {
            Ok(0) => return Err(Error::ConnectionClosed),
            Ok(n) => discarded += n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }

    if discarded > 0 {
        debug!("Discarded {} stale bytes", discarded);
    }
    Ok(())
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.resolve_addr().await?;

        debug!("Connecting to serial bridge {}...", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(Error::Io)?;

        // Frames are tiny; do not let Nagle hold them back
        stream.set_nodelay(true)?;

        debug!("Connected to serial bridge {}", addr);

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Disconnecting from {}...", self.endpoint());
            let _ = stream.shutdown().await;
        }

        self.socket_addr = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        discard_stale(stream)?;

        trace!("Sending {} bytes: {:02X?}", data.len(), data);

        let mut written = 0;
        while written < data.len() {
            match stream.write(&data[written..]).await? {
                0 => {
                    return Err(Error::WriteIncomplete {
                        written,
                        expected: data.len(),
                    });
                }
                n => written += n,
            }
        }
        stream.flush().await?;

        Ok(())
    }

    async fn receive(&mut self, expected_len: usize, timeout: Duration) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let deadline = Instant::now() + timeout;
        let mut buf = vec![0u8; expected_len];
        let mut filled = 0;

        while filled < expected_len {
            match timeout_at(deadline, stream.read(&mut buf[filled..])).await {
                Err(_) => break,
                Ok(Ok(0)) => {
                    if filled == 0 {
                        return Err(Error::ConnectionClosed);
                    }
                    warn!("Bridge closed after {} bytes", filled);
                    break;
                }
                Ok(Ok(n)) => filled += n,
                Ok(Err(e)) => return Err(Error::Io(e)),
            }
        }

        trace!("Received {} bytes: {:02X?}", filled, &buf[..filled]);

        settle_read(BytesMut::from(&buf[..filled]), expected_len, timeout)
    }

    fn endpoint(&self) -> String {
        self.socket_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.addr, self.port))
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("TCP transport dropped while still connected");
        }
    }
}
