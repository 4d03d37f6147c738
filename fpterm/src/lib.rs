//! # fpterm
//!
//! Driver and attendance controller for AS608-class fingerprint sensors.
//!
//! ## Features
//!
//! - Typed command frames with derived checksums
//! - Async/await API using Tokio, over a serial port or a TCP serial bridge
//! - Paced enrollment and verification workflows
//! - A single-owner state machine fed by signal handles
//!
//! ## Quick Start
//!
//! ```no_run
//! use fpterm::{Config, Controller, LogDisplay, LogTelemetry, Sensor};
//!
//! #[tokio::main]
//! async fn main() -> fpterm::Result<()> {
//!     // Password verification happens on connect
//!     let mut sensor = Sensor::serial("/dev/ttyS0", fpterm::DEFAULT_BAUD_RATE);
//!     sensor.connect().await?;
//!
//!     let (mut controller, signals) =
//!         Controller::new(sensor, LogDisplay::new(), LogTelemetry, Config::default());
//!
//!     // Button and touch handlers get clones of `signals`
//!     signals.set_presence(true);
//!     if let Some(outcome) = controller.step().await {
//!         println!("{:?}", outcome);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod sensor;
pub mod telemetry;
pub mod workflow;

#[cfg(test)]
mod test_support;

// Re-exports
pub use config::{Config, Pacing, RetryPolicy, SensorConfig};
pub use controller::{Controller, Outcome, Request, SignalHandle};
pub use display::{LogDisplay, StatusDisplay, StatusLabel};
pub use error::{Error, Result, WorkflowError};
pub use sensor::Sensor;
pub use telemetry::{LogTelemetry, Telemetry, TelemetryError};

// Re-export types
pub use fpterm_core::constants::{DEFAULT_BAUD_RATE, LIBRARY_CAPACITY};
pub use fpterm_core::{CharBuffer, ConfirmationCode, Instruction, Packet};
pub use fpterm_transport::{SerialTransport, TcpTransport, Transport};
pub use fpterm_types::{
    EnrollmentRecord, EventKind, MatchResult, StoragePosition, SystemState, TelemetryRecord,
};
