//! Attendance telemetry collaborator

use async_trait::async_trait;
use tracing::info;

use fpterm_types::TelemetryRecord;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Telemetry endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("Record rejected: {0}")]
    Rejected(String),
}

/// Sink for attendance records
///
/// The controller submits one record per workflow outcome, logs a
/// failure and moves on. Implementations must not retry on its behalf
/// in a way that blocks the terminal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Telemetry: Send + Sync {
    async fn submit(&self, record: TelemetryRecord) -> Result<(), TelemetryError>;
}

/// Writes each record to the log as one JSON line
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

impl LogTelemetry {
    /// JSON body of a record as the remote sheet expects it
    pub fn encode(record: &TelemetryRecord) -> Result<String, TelemetryError> {
        Ok(serde_json::to_string(record)?)
    }
}

#[async_trait]
impl Telemetry for LogTelemetry {
    async fn submit(&self, record: TelemetryRecord) -> Result<(), TelemetryError> {
        let body = Self::encode(&record)?;
        info!(target: "fpterm::telemetry", "{}", body);
        Ok(())
    }
}

#[async_trait]
impl<T: Telemetry + ?Sized> Telemetry for Box<T> {
    async fn submit(&self, record: TelemetryRecord) -> Result<(), TelemetryError> {
        (**self).submit(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use fpterm_types::MatchResult;

    #[test]
    fn test_encode_verified() {
        let time = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let record = TelemetryRecord::verified(MatchResult::new(12, 88), time);

        assert_eq!(
            LogTelemetry::encode(&record).unwrap(),
            r#"{"Event":"verified","ID":12,"Score":88,"Time":"2024-01-02 03:04:05"}"#
        );
    }

    #[tokio::test]
    async fn test_log_telemetry_accepts_records() {
        let time = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        LogTelemetry
            .submit(TelemetryRecord::denied(time))
            .await
            .unwrap();
    }
}
