//! Transport layer for the AS608 protocol
//!
//! Provides the half-duplex byte link to the module: a local UART or a
//! TCP serial bridge.

pub mod error;
pub mod serial;
pub mod tcp;

pub use error::{Error, Result};
pub use serial::SerialTransport;
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Default time to wait for a complete response
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(5000);

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the link
    async fn connect(&mut self) -> Result<()>;

    /// Close the link
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    ///
    /// Fails with [`Error::WriteIncomplete`] if the link accepts fewer bytes
    /// than requested.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive exactly `expected_len` bytes, waiting at most `timeout`
    ///
    /// Zero bytes yields [`Error::ReadTimeout`], a short read yields
    /// [`Error::ReadPartial`].
    async fn receive(&mut self, expected_len: usize, timeout: Duration) -> Result<BytesMut>;

    /// Human-readable endpoint (port path or bridge address)
    fn endpoint(&self) -> String;
}

/// Classify the bytes gathered by a bounded read
///
/// Shared by every transport so they agree on the timeout/partial contract.
pub fn settle_read(buf: BytesMut, expected_len: usize, timeout: Duration) -> Result<BytesMut> {
    match buf.len() {
        0 => Err(Error::ReadTimeout {
            timeout_ms: timeout.as_millis() as u64,
        }),
        received if received < expected_len => Err(Error::ReadPartial {
            received,
            expected: expected_len,
        }),
        _ => Ok(buf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_read_empty_is_timeout() {
        let result = settle_read(BytesMut::new(), 12, Duration::from_millis(5000));
        assert!(matches!(result, Err(Error::ReadTimeout { timeout_ms: 5000 })));
    }

    #[test]
    fn test_settle_read_short_is_partial() {
        let result = settle_read(BytesMut::from(&[0u8; 7][..]), 12, DEFAULT_READ_TIMEOUT);
        assert!(matches!(
            result,
            Err(Error::ReadPartial {
                received: 7,
                expected: 12
            })
        ));
    }

    #[test]
    fn test_settle_read_exact() {
        let buf = settle_read(BytesMut::from(&[1u8; 12][..]), 12, DEFAULT_READ_TIMEOUT).unwrap();
        assert_eq!(buf.len(), 12);
    }

    #[test]
    fn test_read_shortfall_classification() {
        assert!(Error::ReadTimeout { timeout_ms: 1 }.is_read_shortfall());
        assert!(!Error::NotConnected.is_read_shortfall());
    }
}
