//! Error types for fpterm-core

use crate::command::{ConfirmationCode, Instruction};

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame could not be parsed
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Payload does not fit in a single frame
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Module answered with a non-zero confirmation code
    #[error("{instruction} rejected: {code}")]
    UnexpectedConfirmationCode {
        instruction: Instruction,
        code: ConfirmationCode,
    },

    /// Unknown instruction code
    #[error("Unknown instruction code: 0x{0:02X}")]
    UnknownInstruction(u8),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrame(reason.into())
    }

    /// Confirmation code carried by this error, if the module answered at all
    pub fn confirmation_code(&self) -> Option<ConfirmationCode> {
        match self {
            Self::UnexpectedConfirmationCode { code, .. } => Some(*code),
            _ => None,
        }
    }
}
