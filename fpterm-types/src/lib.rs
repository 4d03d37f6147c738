//! Type definitions for fpterm

pub mod enrollment;
pub mod error;
pub mod matching;
pub mod record;
pub mod state;

pub use enrollment::{EnrollmentRecord, StoragePosition};
pub use error::{Error, Result};
pub use matching::MatchResult;
pub use record::{EventKind, TelemetryRecord};
pub use state::SystemState;
