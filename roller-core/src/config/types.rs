//! Device and timing configuration

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::MotionConfig;
use crate::supervisor::SupervisorConfig;

/// Maximum client id length
pub const MAX_CLIENT_ID_LEN: usize = 32;

/// Maximum topic prefix length
///
/// Leaves room for the longest topic suffix within a 64 byte topic.
pub const MAX_PREFIX_LEN: usize = 40;

/// Maximum firmware version string length
pub const MAX_VERSION_LEN: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A string value does not fit its buffer
    TooLong,
    /// A required value is empty
    Empty,
    /// A value is outside its valid range
    OutOfRange,
    /// A value could not be parsed
    Invalid,
}

/// Timing parameters of the control loop (all in milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Control loop period
    pub tick_ms: u64,
    /// Push button stability threshold
    pub button_debounce_ms: u64,
    /// End-of-travel sensor stability threshold
    pub end_sensor_debounce_ms: u64,
    /// Relay settle time before engaging a direction
    pub settle_ms: u32,
    /// Rolling time after which the blind is considered obstructed
    pub rolling_timeout_ms: u64,
    /// Minimum time between bus connection attempts
    pub reconnect_interval_ms: u64,
    /// Disconnected time after which the device restarts
    pub liveness_timeout_ms: u64,
    /// Maximum duration of a firmware update session
    pub update_timeout_ms: u64,
    /// Pause after a failed update before restarting
    pub update_failure_hold_ms: u32,
    /// Pause between persisting a restart record and restarting
    pub restart_grace_ms: u32,
    /// Hardware watchdog period
    pub watchdog_timeout_ms: u32,
    /// Lifetime of queued button events; 0 disables expiry
    pub event_ttl_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            button_debounce_ms: 100,
            end_sensor_debounce_ms: 50,
            settle_ms: 300,
            rolling_timeout_ms: 60_000,
            reconnect_interval_ms: 5_000,
            liveness_timeout_ms: 60_000,
            update_timeout_ms: 300_000,
            update_failure_hold_ms: 5_000,
            restart_grace_ms: 200,
            watchdog_timeout_ms: 8_000,
            event_ttl_ms: 30_000,
        }
    }
}

impl TimingConfig {
    pub fn motion(&self) -> MotionConfig {
        MotionConfig {
            settle_ms: self.settle_ms,
            obstruction_timeout_ms: self.rolling_timeout_ms,
        }
    }

    pub fn supervisor(&self) -> SupervisorConfig {
        SupervisorConfig {
            reconnect_interval_ms: self.reconnect_interval_ms,
            liveness_timeout_ms: self.liveness_timeout_ms,
        }
    }

    /// Check values the loop cannot work with
    ///
    /// The tick must fit well inside the watchdog period, and every timeout
    /// must leave room for at least one tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 || self.watchdog_timeout_ms == 0 {
            return Err(ConfigError::OutOfRange);
        }
        if self.tick_ms.saturating_mul(4) > u64::from(self.watchdog_timeout_ms) {
            return Err(ConfigError::OutOfRange);
        }
        if self.rolling_timeout_ms < self.tick_ms || self.liveness_timeout_ms < self.tick_ms {
            return Err(ConfigError::OutOfRange);
        }
        Ok(())
    }
}

/// Active-low flags of the pins the control loop reads or drives directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polarity {
    pub end_sensor_active_low: bool,
    pub button_active_low: bool,
    pub audio_active_low: bool,
}

impl Default for Polarity {
    fn default() -> Self {
        Self {
            end_sensor_active_low: true,
            button_active_low: true,
            audio_active_low: false,
        }
    }
}

/// Device identity and behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Client id presented to the bus
    pub client_id: String<MAX_CLIENT_ID_LEN>,
    /// Prefix of every topic, without a trailing slash
    pub topic_prefix: String<MAX_PREFIX_LEN>,
    /// Version string published on connect
    pub firmware_version: String<MAX_VERSION_LEN>,
    /// Timing parameters
    pub timing: TimingConfig,
    /// Pin polarities
    pub polarity: Polarity,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let mut client_id = String::new();
        let _ = client_id.push_str("roller");
        let mut topic_prefix = String::new();
        let _ = topic_prefix.push_str("dev/roller");
        let mut firmware_version = String::new();
        let _ = firmware_version.push_str(env!("CARGO_PKG_VERSION"));
        Self {
            client_id,
            topic_prefix,
            firmware_version,
            timing: TimingConfig::default(),
            polarity: Polarity::default(),
        }
    }
}

impl DeviceConfig {
    /// Set the client id
    ///
    /// The topic prefix follows as `dev/<client_id>`.
    pub fn set_client_id(&mut self, id: &str) -> Result<(), ConfigError> {
        if id.is_empty() {
            return Err(ConfigError::Empty);
        }
        let mut client_id = String::new();
        client_id.push_str(id).map_err(|_| ConfigError::TooLong)?;
        let mut prefix = String::new();
        prefix.push_str("dev/").map_err(|_| ConfigError::TooLong)?;
        prefix.push_str(id).map_err(|_| ConfigError::TooLong)?;
        self.client_id = client_id;
        self.topic_prefix = prefix;
        Ok(())
    }

    /// Override the topic prefix
    pub fn set_topic_prefix(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return Err(ConfigError::Empty);
        }
        self.topic_prefix.clear();
        self.topic_prefix
            .push_str(prefix)
            .map_err(|_| ConfigError::TooLong)
    }

    /// Set the version string
    pub fn set_firmware_version(&mut self, version: &str) -> Result<(), ConfigError> {
        self.firmware_version.clear();
        self.firmware_version
            .push_str(version)
            .map_err(|_| ConfigError::TooLong)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.is_empty() || self.topic_prefix.is_empty() {
            return Err(ConfigError::Empty);
        }
        self.timing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DeviceConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.timing.reconnect_interval_ms, 5_000);
        assert_eq!(config.timing.update_timeout_ms, 300_000);
    }

    #[test]
    fn test_client_id_sets_prefix() {
        let mut config = DeviceConfig::default();
        config.set_client_id("roller-02").unwrap();
        assert_eq!(config.client_id.as_str(), "roller-02");
        assert_eq!(config.topic_prefix.as_str(), "dev/roller-02");

        assert_eq!(config.set_client_id(""), Err(ConfigError::Empty));
        let long = [b'x'; MAX_CLIENT_ID_LEN + 1];
        let long = core::str::from_utf8(&long).unwrap();
        assert_eq!(config.set_client_id(long), Err(ConfigError::TooLong));
        assert_eq!(config.client_id.as_str(), "roller-02");
    }

    #[test]
    fn test_prefix_trailing_slash_trimmed() {
        let mut config = DeviceConfig::default();
        config.set_topic_prefix("home/blinds/").unwrap();
        assert_eq!(config.topic_prefix.as_str(), "home/blinds");
    }

    #[test]
    fn test_tick_must_fit_watchdog() {
        let timing = TimingConfig {
            tick_ms: 3_000,
            ..TimingConfig::default()
        };
        assert_eq!(timing.validate(), Err(ConfigError::OutOfRange));
    }
}
