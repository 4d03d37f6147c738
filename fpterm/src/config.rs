//! Terminal configuration
//!
//! Every human-paced wait is a named value here so deployments can tune
//! them and tests can run with [`Pacing::immediate`].

use std::time::Duration;

use fpterm_core::constants::{
    DEFAULT_ADDRESS, DEFAULT_PASSWORD, DEFAULT_READ_TIMEOUT_MS, MAX_REGISTER_ATTEMPTS,
    REGISTER_RETRY_PAUSE_MS,
};

/// Retry behaviour for template registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,

    /// Pause after each rejected attempt
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: MAX_REGISTER_ATTEMPTS,
            pause: Duration::from_millis(REGISTER_RETRY_PAUSE_MS),
        }
    }
}

/// Sensor link settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    /// Module address
    pub address: u32,

    /// Module password checked at startup
    pub password: u32,

    /// Maximum wait for each response
    pub read_timeout: Duration,

    /// Registration retries
    pub register_retry: RetryPolicy,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            password: DEFAULT_PASSWORD,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            register_retry: RetryPolicy::default(),
        }
    }
}

impl SensorConfig {
    pub fn with_address(mut self, address: u32) -> Self {
        self.address = address;
        self
    }

    pub fn with_password(mut self, password: u32) -> Self {
        self.password = password;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_register_retry(mut self, retry: RetryPolicy) -> Self {
        self.register_retry = retry;
        self
    }
}

/// Human-paced waits around the workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Time to put a finger down before the first enrollment capture
    pub first_placement: Duration,

    /// Time to lift the finger between enrollment captures
    pub removal: Duration,

    /// Time to put the finger down again for the second capture
    pub second_placement: Duration,

    /// Time for the finger to settle before a verification capture
    pub verify_settle: Duration,

    /// Pause between announcing enrollment and starting it
    pub enroll_lead_in: Duration,

    /// Time to lift the finger after enrollment, before going idle
    pub enroll_cooldown: Duration,

    /// How long a denial stays on screen
    pub deny_hold: Duration,

    /// Pause after verification so the same touch is not read twice
    pub verify_cooldown: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            first_placement: Duration::from_secs(3),
            removal: Duration::from_secs(3),
            second_placement: Duration::from_secs(3),
            verify_settle: Duration::from_secs(3),
            enroll_lead_in: Duration::from_secs(3),
            enroll_cooldown: Duration::from_secs(3),
            deny_hold: Duration::from_secs(2),
            verify_cooldown: Duration::from_secs(3),
        }
    }
}

impl Pacing {
    /// No waits at all
    pub fn immediate() -> Self {
        Self {
            first_placement: Duration::ZERO,
            removal: Duration::ZERO,
            second_placement: Duration::ZERO,
            verify_settle: Duration::ZERO,
            enroll_lead_in: Duration::ZERO,
            enroll_cooldown: Duration::ZERO,
            deny_hold: Duration::ZERO,
            verify_cooldown: Duration::ZERO,
        }
    }
}

/// Complete terminal configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sensor: SensorConfig,
    pub pacing: Pacing,

    /// How often the idle controller checks for work
    pub poll_interval: Duration,

    /// Pending enroll requests kept before new ones are dropped
    pub request_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),
            pacing: Pacing::default(),
            poll_interval: Duration::from_millis(100),
            request_capacity: 8,
        }
    }
}

impl Config {
    pub fn with_sensor(mut self, sensor: SensorConfig) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the request queue depth (at least 1)
    pub fn with_request_capacity(mut self, capacity: usize) -> Self {
        self.request_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_module_factory_settings() {
        let config = Config::default();

        assert_eq!(config.sensor.address, 0xFFFF_FFFF);
        assert_eq!(config.sensor.password, 0);
        assert_eq!(config.sensor.read_timeout, Duration::from_millis(5000));
        assert_eq!(config.sensor.register_retry.attempts, 3);
        assert_eq!(config.sensor.register_retry.pause, Duration::from_millis(500));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_immediate_pacing() {
        let pacing = Pacing::immediate();
        assert_eq!(pacing.first_placement, Duration::ZERO);
        assert_eq!(pacing.deny_hold, Duration::ZERO);
    }

    #[test]
    fn test_request_capacity_floor() {
        let config = Config::default().with_request_capacity(0);
        assert_eq!(config.request_capacity, 1);
    }
}
