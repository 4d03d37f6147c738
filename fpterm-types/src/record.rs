//! Attendance records handed to the telemetry collaborator

use chrono::{DateTime, Datelike, Local};
use serde::{Serialize, Serializer};

use crate::{enrollment::StoragePosition, matching::MatchResult};

/// Wall-clock format used by the remote attendance sheet
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Earliest year accepted as a synchronized clock
///
/// Before network time arrives the clock counts up from the epoch.
pub const MIN_SYNCHRONIZED_YEAR: i32 = 2020;

/// What happened at the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Enrolled,
    EnrollFailed,
    Verified,
    Denied,
}

/// One outcome, serialized as `{"Event": .., "ID": .., "Score": .., "Time": ..}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    #[serde(rename = "Event")]
    pub event: EventKind,

    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub finger_id: Option<u16>,

    #[serde(rename = "Score", skip_serializing_if = "Option::is_none")]
    pub score: Option<u16>,

    #[serde(rename = "Time", serialize_with = "serialize_time")]
    pub time: DateTime<Local>,
}

impl TelemetryRecord {
    pub fn enrolled(position: StoragePosition, time: DateTime<Local>) -> Self {
        Self {
            event: EventKind::Enrolled,
            finger_id: Some(position.get()),
            score: None,
            time,
        }
    }

    pub fn enroll_failed(position: StoragePosition, time: DateTime<Local>) -> Self {
        Self {
            event: EventKind::EnrollFailed,
            finger_id: Some(position.get()),
            score: None,
            time,
        }
    }

    pub fn verified(result: MatchResult, time: DateTime<Local>) -> Self {
        Self {
            event: EventKind::Verified,
            finger_id: Some(result.matched_id),
            score: Some(result.score),
            time,
        }
    }

    pub fn denied(time: DateTime<Local>) -> Self {
        Self {
            event: EventKind::Denied,
            finger_id: None,
            score: None,
            time,
        }
    }

    /// Whether the timestamp came from a synchronized clock
    pub fn has_synchronized_time(&self) -> bool {
        self.time.year() >= MIN_SYNCHRONIZED_YEAR
    }
}

fn serialize_time<S: Serializer>(time: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(TIME_FORMAT))
}
