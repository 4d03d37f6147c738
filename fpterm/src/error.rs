//! High-level error types

use fpterm_core::{CharBuffer, ConfirmationCode};
use fpterm_types::StoragePosition;

pub type Result<T> = std::result::Result<T, Error>;

/// Sensor command failures
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Protocol(#[from] fpterm_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] fpterm_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] fpterm_types::Error),

    #[error("Sensor not connected")]
    NotConnected,

    #[error("Template registration failed after {attempts} attempts: {code}")]
    RegistrationFailed {
        attempts: u32,
        code: ConfirmationCode,
    },

    #[error("No matching template: {code}")]
    NotFound { code: ConfirmationCode },
}

impl Error {
    /// Confirmation code returned by the module, if it answered at all
    pub fn confirmation_code(&self) -> Option<ConfirmationCode> {
        match self {
            Self::Protocol(e) => e.confirmation_code(),
            Self::RegistrationFailed { code, .. } | Self::NotFound { code } => Some(*code),
            _ => None,
        }
    }

    /// Check if a later attempt might succeed (e.g. with a better finger placement)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_read_shortfall(),
            Self::Protocol(_) | Self::RegistrationFailed { .. } | Self::NotFound { .. } => true,
            _ => false,
        }
    }
}

/// Enrollment and verification failures, named after the step that failed
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Image capture failed: {0}")]
    CaptureFailed(#[source] Error),

    #[error("Feature extraction into {buffer} failed: {source}")]
    ExtractionFailed {
        buffer: CharBuffer,
        #[source]
        source: Error,
    },

    #[error("Template registration failed: {0}")]
    RegistrationFailed(#[source] Error),

    #[error("Storing template at {position} failed: {source}")]
    StoreFailed {
        position: StoragePosition,
        #[source]
        source: Error,
    },

    #[error("Fingerprint not found: {0}")]
    NotFound(#[source] Error),

    #[error("Library search failed: {0}")]
    SearchFailed(#[source] Error),
}

impl WorkflowError {
    /// Underlying sensor error
    pub fn sensor_error(&self) -> &Error {
        match self {
            Self::CaptureFailed(e)
            | Self::RegistrationFailed(e)
            | Self::NotFound(e)
            | Self::SearchFailed(e) => e,
            Self::ExtractionFailed { source, .. } | Self::StoreFailed { source, .. } => source,
        }
    }
}
