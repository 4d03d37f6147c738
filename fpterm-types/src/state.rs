//! Controller state

use std::fmt;

/// Top-level terminal state
///
/// Written only by the controller; everyone else observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SystemState {
    /// Waiting for a finger or an enroll request
    #[default]
    Idle,

    /// Running the two-capture enrollment workflow
    Enroll,

    /// Running a library search for the presented finger
    Verifying,
}

impl SystemState {
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Enroll => "ENROLL",
            Self::Verifying => "VERIFYING",
        }
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
