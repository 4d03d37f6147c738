//! Terminal state machine
//!
//! The controller owns the sensor and is the only writer of
//! [`SystemState`]. Everything outside it holds a [`SignalHandle`], which
//! can queue an enroll request or set the finger-presence level but never
//! touches the state or the sensor directly. A request raised while a
//! workflow is running stays queued until the controller is back in
//! [`SystemState::Idle`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::{
    mpsc::{self, error::TryRecvError, error::TrySendError},
    watch,
};
use tracing::{debug, info, warn};

use fpterm_types::{EnrollmentRecord, MatchResult, StoragePosition, SystemState, TelemetryRecord};

use crate::config::Config;
use crate::display::{StatusDisplay, StatusLabel};
use crate::error::WorkflowError;
use crate::sensor::Sensor;
use crate::telemetry::Telemetry;
use crate::workflow;

/// Wall-clock source for telemetry timestamps
pub type Clock = fn() -> DateTime<Local>;

/// Transition request queued by the signal context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Enroll,
}

/// Result of one workflow run
#[derive(Debug)]
pub enum Outcome {
    Enrolled(StoragePosition),
    EnrollFailed(WorkflowError),
    Verified(MatchResult),
    Denied(WorkflowError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Enrolled(_) | Self::Verified(_))
    }
}

/// Signal-side view of the controller
///
/// Cheap to clone. The controller's [`run`](Controller::run) loop ends
/// once every handle is dropped.
#[derive(Debug, Clone)]
pub struct SignalHandle {
    requests: mpsc::Sender<Request>,
    presence: Arc<watch::Sender<bool>>,
    state: watch::Receiver<SystemState>,
}

impl SignalHandle {
    /// Queue an enroll request (edge-triggered)
    ///
    /// Never blocks. Returns `false` if the request was dropped because the
    /// queue is full or the controller is gone.
    pub fn request_enroll(&self) -> bool {
        match self.requests.try_send(Request::Enroll) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Request queue full, dropping enroll request");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Controller stopped, ignoring enroll request");
                false
            }
        }
    }

    /// Set the finger-presence level
    pub fn set_presence(&self, present: bool) {
        self.presence.send_replace(present);
    }

    /// State last published by the controller
    pub fn state(&self) -> SystemState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<SystemState> {
        self.state.clone()
    }
}

enum Pending {
    Enroll,
    Verify,
    Nothing,
    Closed,
}

/// Runs enrollment and verification workflows in response to signals
pub struct Controller<D, T> {
    sensor: Sensor,
    display: D,
    telemetry: T,
    config: Config,
    record: EnrollmentRecord,
    clock: Clock,
    state: watch::Sender<SystemState>,
    requests: mpsc::Receiver<Request>,
    presence: watch::Receiver<bool>,
}

impl<D, T> Controller<D, T>
where
    D: StatusDisplay,
    T: Telemetry,
{
    /// Create a controller and the handle the signal context uses
    ///
    /// The sensor should already be connected; password verification at
    /// connect is the only fatal failure and belongs to startup. From here
    /// on the sensor runs with `config.sensor`, replacing whatever it was
    /// built with.
    pub fn new(sensor: Sensor, display: D, telemetry: T, config: Config) -> (Self, SignalHandle) {
        let sensor = sensor.with_config(config.sensor.clone());
        let (request_tx, request_rx) = mpsc::channel(config.request_capacity.max(1));
        let (presence_tx, presence_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SystemState::Idle);

        let controller = Self {
            sensor,
            display,
            telemetry,
            config,
            record: EnrollmentRecord::new(),
            clock: Local::now,
            state: state_tx,
            requests: request_rx,
            presence: presence_rx,
        };
        let handle = SignalHandle {
            requests: request_tx,
            presence: Arc::new(presence_tx),
            state: state_rx,
        };

        (controller, handle)
    }

    /// Resume enrollment from an existing record
    pub fn with_enrollment(mut self, record: EnrollmentRecord) -> Self {
        self.record = record;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> SystemState {
        *self.state.borrow()
    }

    pub fn enrollment(&self) -> &EnrollmentRecord {
        &self.record
    }

    pub fn sensor_mut(&mut self) -> &mut Sensor {
        &mut self.sensor
    }

    /// Make one Idle decision and run the chosen workflow to completion
    ///
    /// Returns `None` when there was nothing to do.
    pub async fn step(&mut self) -> Option<Outcome> {
        match self.pending() {
            Pending::Enroll => Some(self.run_enroll().await),
            Pending::Verify => Some(self.run_verify().await),
            Pending::Nothing | Pending::Closed => None,
        }
    }

    /// Step until every [`SignalHandle`] has been dropped
    pub async fn run(&mut self) {
        info!("Controller started");
        self.display.show_state(StatusLabel::Idle);

        loop {
            match self.pending() {
                Pending::Enroll => {
                    self.run_enroll().await;
                }
                Pending::Verify => {
                    self.run_verify().await;
                }
                Pending::Nothing => tokio::time::sleep(self.config.poll_interval).await,
                Pending::Closed => break,
            }
        }

        info!("All signal handles dropped, controller stopped");
    }

    fn pending(&mut self) -> Pending {
        match self.requests.try_recv() {
            Ok(Request::Enroll) => return Pending::Enroll,
            Err(TryRecvError::Disconnected) => return Pending::Closed,
            Err(TryRecvError::Empty) => {}
        }

        if *self.presence.borrow() {
            Pending::Verify
        } else {
            Pending::Nothing
        }
    }

    fn transition(&mut self, next: SystemState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!("State {} -> {}", previous, next);
        }
    }

    async fn run_enroll(&mut self) -> Outcome {
        self.transition(SystemState::Enroll);
        self.display.show_state(StatusLabel::Enrolling);
        info!("Enrollment mode. Preparing...");
        pause(self.config.pacing.enroll_lead_in).await;

        let position = self.record.position();
        let result = workflow::enroll(&mut self.sensor, position, &self.config.pacing).await;
        let outcome = match result {
            Ok(()) => {
                let stored = self.record.advance();
                self.display.show_state(StatusLabel::Success);
                let record = TelemetryRecord::enrolled(stored, (self.clock)());
                submit(&self.telemetry, record).await;
                Outcome::Enrolled(stored)
            }
            Err(e) => {
                warn!("Enrollment at {} failed: {}", position, e);
                self.display.show_state(StatusLabel::Failure);
                let record = TelemetryRecord::enroll_failed(position, (self.clock)());
                submit(&self.telemetry, record).await;
                Outcome::EnrollFailed(e)
            }
        };

        info!("Please remove your finger.");
        pause(self.config.pacing.enroll_cooldown).await;

        self.transition(SystemState::Idle);
        self.display.show_state(StatusLabel::Idle);
        outcome
    }

    async fn run_verify(&mut self) -> Outcome {
        self.transition(SystemState::Verifying);
        self.display.show_state(StatusLabel::Verifying);

        let result = workflow::verify(&mut self.sensor, &self.config.pacing).await;
        let outcome = match result {
            Ok(result) => {
                self.display.show_state(StatusLabel::Success);
                let record = TelemetryRecord::verified(result, (self.clock)());
                submit(&self.telemetry, record).await;
                Outcome::Verified(result)
            }
            Err(e) => {
                warn!("Access denied: {}", e);
                self.display.show_state(StatusLabel::Failure);
                pause(self.config.pacing.deny_hold).await;
                let record = TelemetryRecord::denied((self.clock)());
                submit(&self.telemetry, record).await;
                Outcome::Denied(e)
            }
        };

        self.transition(SystemState::Idle);
        self.display.show_state(StatusLabel::Idle);
        pause(self.config.pacing.verify_cooldown).await;
        outcome
    }
}

/// Hand a record to telemetry, logging rather than propagating failures
async fn submit<T: Telemetry>(telemetry: &T, record: TelemetryRecord) {
    if !record.has_synchronized_time() {
        debug!("Clock not synchronized, skipping telemetry");
        return;
    }

    if let Err(e) = telemetry.submit(record).await {
        warn!("Telemetry submission failed: {}", e);
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
