//! Enrollment and verification sequences
//!
//! Both are fail-fast: the first failing step ends the workflow and no
//! cleanup is attempted, since the module's buffers cannot be reset from
//! outside. Neither touches the enrollment record; the controller advances
//! it only after [`enroll`] returns `Ok`.

use std::fmt;
use std::time::Duration;

use tracing::info;

use fpterm_core::{CharBuffer, constants::LIBRARY_CAPACITY};
use fpterm_types::{MatchResult, StoragePosition};

use crate::config::Pacing;
use crate::error::{Error, WorkflowError};
use crate::sensor::Sensor;

/// A wait sized for a person, not for the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacedStep {
    FirstPlacement,
    Removal,
    SecondPlacement,
    VerifySettle,
}

impl PacedStep {
    /// Prompt shown to the user while waiting
    pub fn prompt(self) -> &'static str {
        match self {
            Self::FirstPlacement => "Please place your finger on the sensor.",
            Self::Removal => "Please remove your finger.",
            Self::SecondPlacement => "Please place your finger again.",
            Self::VerifySettle => "Place your finger on the sensor.",
        }
    }

    pub fn duration(self, pacing: &Pacing) -> Duration {
        match self {
            Self::FirstPlacement => pacing.first_placement,
            Self::Removal => pacing.removal,
            Self::SecondPlacement => pacing.second_placement,
            Self::VerifySettle => pacing.verify_settle,
        }
    }
}

impl fmt::Display for PacedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt())
    }
}

async fn wait_for(step: PacedStep, pacing: &Pacing) {
    info!("{}", step);
    let duration = step.duration(pacing);
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

async fn capture(sensor: &mut Sensor, buffer: CharBuffer) -> Result<(), WorkflowError> {
    sensor
        .generate_image()
        .await
        .map_err(WorkflowError::CaptureFailed)?;

    sensor
        .generate_character(buffer)
        .await
        .map_err(|source| WorkflowError::ExtractionFailed { buffer, source })
}

/// Enroll a finger at `position`
///
/// Two captures of the same finger are merged into one template and
/// stored in the module's library.
pub async fn enroll(
    sensor: &mut Sensor,
    position: StoragePosition,
    pacing: &Pacing,
) -> Result<(), WorkflowError> {
    wait_for(PacedStep::FirstPlacement, pacing).await;
    capture(sensor, CharBuffer::One).await?;

    wait_for(PacedStep::Removal, pacing).await;
    wait_for(PacedStep::SecondPlacement, pacing).await;
    capture(sensor, CharBuffer::Two).await?;

    sensor
        .register_model()
        .await
        .map_err(WorkflowError::RegistrationFailed)?;

    info!("Storing fingerprint at position {}", position);
    sensor
        .store_template(position)
        .await
        .map_err(|source| WorkflowError::StoreFailed { position, source })?;

    info!("Fingerprint stored successfully at position {}", position);
    Ok(())
}

/// Identify the finger on the sensor against the whole library
///
/// A single attempt: a miss is a denial for the user, not a driver fault.
pub async fn verify(sensor: &mut Sensor, pacing: &Pacing) -> Result<MatchResult, WorkflowError> {
    wait_for(PacedStep::VerifySettle, pacing).await;
    capture(sensor, CharBuffer::One).await?;

    let result = sensor
        .search(CharBuffer::One, 0, LIBRARY_CAPACITY)
        .await
        .map_err(|e| match e {
            Error::NotFound { .. } => WorkflowError::NotFound(e),
            other => WorkflowError::SearchFailed(other),
        })?;

    info!(
        "Fingerprint matched! ID: {}, Score: {}",
        result.matched_id, result.score
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTransport;
    use fpterm_core::ConfirmationCode;
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    const OK: u8 = 0x00;

    fn position(p: u16) -> StoragePosition {
        StoragePosition::new(p).unwrap()
    }

    #[tokio::test]
    async fn test_enroll_happy_path_order() {
        let script = ScriptedTransport::new()
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK);
        let mut sensor = Sensor::new(script.clone());

        enroll(&mut sensor, position(4), &Pacing::immediate())
            .await
            .unwrap();

        // GenImg, Img2Tz, GenImg, Img2Tz, RegModel, Store
        assert_eq!(
            script.sent_instructions(),
            vec![0x01, 0x02, 0x01, 0x02, 0x05, 0x06]
        );
        let sent = script.sent();
        assert_eq!(sent[1][10], 0x01);
        assert_eq!(sent[3][10], 0x02);
        assert_eq!(&sent[5][10..13], &[0x02, 0x00, 0x04]);
    }

    #[tokio::test]
    async fn test_enroll_at_last_position() {
        let script = ScriptedTransport::new()
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK);
        let mut sensor = Sensor::new(script.clone());

        enroll(&mut sensor, position(175), &Pacing::immediate())
            .await
            .unwrap();

        assert_eq!(&script.sent()[5][11..13], &[0x00, 0xAF]);
    }

    #[tokio::test]
    async fn test_enroll_stops_at_first_capture_failure() {
        let script = ScriptedTransport::new().ack(0x02).ack(OK).ack(OK);
        let mut sensor = Sensor::new(script.clone());

        let err = enroll(&mut sensor, position(0), &Pacing::immediate())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::CaptureFailed(_)));
        assert_eq!(
            err.sensor_error().confirmation_code(),
            Some(ConfirmationCode::NoFinger)
        );
        assert_eq!(script.sent_instructions(), vec![0x01]);
        assert_eq!(script.remaining(), 2);
    }

    #[tokio::test]
    async fn test_enroll_short_write_is_capture_failure() {
        let script = ScriptedTransport::new().short_write(0).ack(OK).ack(OK);
        let mut sensor = Sensor::new(script.clone());

        let err = enroll(&mut sensor, position(0), &Pacing::immediate())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::CaptureFailed(Error::Transport(
                fpterm_transport::Error::WriteIncomplete { written: 0, .. }
            ))
        ));
        assert!(script.sent().is_empty());
        assert_eq!(script.remaining(), 2);
    }

    #[test]
    fn test_library_span_covers_every_position() {
        assert_eq!(LIBRARY_CAPACITY, StoragePosition::MAX + 1);
    }

    #[tokio::test]
    async fn test_enroll_second_extraction_failure() {
        let script = ScriptedTransport::new().ack(OK).ack(OK).ack(OK).ack(0x06);
        let mut sensor = Sensor::new(script.clone());

        let err = enroll(&mut sensor, position(0), &Pacing::immediate())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::ExtractionFailed {
                buffer: CharBuffer::Two,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enroll_registration_failure_skips_store() {
        let script = ScriptedTransport::new()
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(0x0A)
            .ack(0x0A)
            .ack(0x0A);
        let mut sensor = Sensor::new(script.clone());

        let err = enroll(&mut sensor, position(0), &Pacing::immediate())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::RegistrationFailed(_)));
        assert!(!script.sent_instructions().contains(&0x06));
    }

    #[tokio::test]
    async fn test_enroll_store_failure() {
        let script = ScriptedTransport::new()
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(0x18);
        let mut sensor = Sensor::new(script.clone());

        let err = enroll(&mut sensor, position(9), &Pacing::immediate())
            .await
            .unwrap_err();

        match err {
            WorkflowError::StoreFailed { position: p, source } => {
                assert_eq!(p, position(9));
                assert_eq!(source.confirmation_code(), Some(ConfirmationCode::FlashError));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_enroll_waits_for_the_user() {
        let script = ScriptedTransport::new()
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK)
            .ack(OK);
        let mut sensor = Sensor::new(script.clone());
        let start = Instant::now();

        enroll(&mut sensor, position(0), &Pacing::default())
            .await
            .unwrap();

        let sent_at = script.sent_at();
        assert!(sent_at[0] - start >= Duration::from_secs(3));
        // Removal and second placement sit between the two captures
        assert!(sent_at[2] - sent_at[1] >= Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_verify_match() {
        let script = ScriptedTransport::new()
            .ack(OK)
            .ack(OK)
            .ack_with(&[OK, 0x00, 0x03, 0x00, 0x55]);
        let mut sensor = Sensor::new(script.clone());

        let result = verify(&mut sensor, &Pacing::immediate()).await.unwrap();

        assert_eq!(result, MatchResult::new(3, 0x55));
        assert_eq!(script.sent_instructions(), vec![0x01, 0x02, 0x04]);
    }

    #[tokio::test]
    async fn test_verify_search_rejection_is_not_found() {
        let script = ScriptedTransport::new()
            .ack(OK)
            .ack(OK)
            .ack_with(&[0x09, 0x00, 0x00, 0x00, 0x00]);
        let mut sensor = Sensor::new(script);

        let err = verify(&mut sensor, &Pacing::immediate()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_verify_search_timeout_is_search_failure() {
        let script = ScriptedTransport::new().ack(OK).ack(OK).timeout();
        let mut sensor = Sensor::new(script);

        let err = verify(&mut sensor, &Pacing::immediate()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::SearchFailed(_)));
    }

    #[tokio::test]
    async fn test_verify_no_retry_after_capture_failure() {
        let script = ScriptedTransport::new().ack(0x02).ack(OK);
        let mut sensor = Sensor::new(script.clone());

        let err = verify(&mut sensor, &Pacing::immediate()).await.unwrap_err();

        assert!(matches!(err, WorkflowError::CaptureFailed(_)));
        assert_eq!(script.sent_instructions(), vec![0x01]);
    }
}
