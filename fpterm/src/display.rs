//! Status display collaborator

use std::fmt;

use tracing::info;

/// What the terminal's screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLabel {
    Idle,
    Enrolling,
    Verifying,
    Success,
    Failure,
}

impl StatusLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Enrolling => "Enrolling",
            Self::Verifying => "Verifying",
            Self::Success => "Success",
            Self::Failure => "Failure",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders terminal status
///
/// Fire-and-forget: the controller never waits on or reads back from
/// the display.
#[cfg_attr(test, mockall::automock)]
pub trait StatusDisplay: Send {
    fn show_state(&mut self, label: StatusLabel);
}

/// Display that renders to the log, for headless terminals
#[derive(Debug, Default)]
pub struct LogDisplay {
    current: Option<StatusLabel>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label shown last, if any
    pub fn current(&self) -> Option<StatusLabel> {
        self.current
    }
}

impl StatusDisplay for LogDisplay {
    fn show_state(&mut self, label: StatusLabel) {
        info!(status = %label, "display");
        self.current = Some(label);
    }
}

impl<D: StatusDisplay + ?Sized> StatusDisplay for Box<D> {
    fn show_state(&mut self, label: StatusLabel) {
        (**self).show_state(label);
    }
}
