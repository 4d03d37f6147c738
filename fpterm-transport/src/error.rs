//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Incomplete write: {written} of {expected} bytes accepted")]
    WriteIncomplete { written: usize, expected: usize },

    #[error("Read timeout after {timeout_ms} ms, no bytes received")]
    ReadTimeout { timeout_ms: u64 },

    #[error("Partial response: {received} of {expected} bytes received")]
    ReadPartial { received: usize, expected: usize },

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Blocking I/O worker failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl Error {
    /// Whether the link itself stayed usable (the module just did not answer in full)
    pub fn is_read_shortfall(&self) -> bool {
        matches!(self, Self::ReadTimeout { .. } | Self::ReadPartial { .. })
    }
}
