//! Restart policy
//!
//! Before every deliberate restart the cause and the uptime are persisted;
//! the next boot reads them back once and reports them. The record is then
//! overwritten with a [`RestartCause::NoError`] placeholder, so a boot that
//! finds the placeholder knows the previous run ended without a controlled
//! restart (watchdog, brown-out, reset pin).

use core::fmt::Write;

use heapless::String;
use roller_hal::SystemControl;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::{RepositoryError, StateRepository};

/// Why the controller restarted itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RestartCause {
    /// No controlled restart on record
    #[default]
    NoError,
    /// Bus connection down past the liveness ceiling
    ConnectivityWatchdog,
    /// Configuration changed
    ConfigurationUpdated,
    /// Restart requested over the bus
    RemoteReset,
    /// Firmware update completed
    UpdateSuccess,
    /// Firmware update failed
    UpdateFailure,
    /// Firmware update did not complete in time
    UpdateTimeout,
    /// Previous run ended without recording a cause
    ExternalReset,
    /// Code written by a newer or older firmware
    Other(u8),
}

impl RestartCause {
    /// Numeric code persisted and published on the code topic
    pub fn code(self) -> u8 {
        match self {
            RestartCause::NoError => 0,
            RestartCause::ConnectivityWatchdog => 1,
            RestartCause::ConfigurationUpdated => 2,
            RestartCause::RemoteReset => 3,
            RestartCause::UpdateSuccess => 4,
            RestartCause::UpdateFailure => 5,
            RestartCause::UpdateTimeout => 6,
            RestartCause::ExternalReset => 7,
            RestartCause::Other(code) => code,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            0 => RestartCause::NoError,
            1 => RestartCause::ConnectivityWatchdog,
            2 => RestartCause::ConfigurationUpdated,
            3 => RestartCause::RemoteReset,
            4 => RestartCause::UpdateSuccess,
            5 => RestartCause::UpdateFailure,
            6 => RestartCause::UpdateTimeout,
            7 => RestartCause::ExternalReset,
            other => RestartCause::Other(other),
        }
    }

    /// Symbolic name
    pub fn name(self) -> &'static str {
        match self {
            RestartCause::NoError => "NO_ERROR",
            RestartCause::ConnectivityWatchdog => "WIFI_SW_WATCHDOG_TIMEOUT",
            RestartCause::ConfigurationUpdated => "CONFIGURATION_UPDATED",
            RestartCause::RemoteReset => "MQTT_RESET_REQUEST",
            RestartCause::UpdateSuccess => "OTA_SUCCESS",
            RestartCause::UpdateFailure => "OTA_FAIL",
            RestartCause::UpdateTimeout => "OTA_TIMEOUT",
            RestartCause::ExternalReset => "EXTERNAL_RESET",
            RestartCause::Other(_) => "UNKNOWN",
        }
    }

    /// Description published on the `sw` topic, e.g. `{code:3,descr:"MQTT_RESET_REQUEST"}`
    pub fn describe(self) -> String<64> {
        let mut out = String::new();
        // Longest name is 24 bytes, well within capacity
        let _ = write!(out, "{{code:{},descr:\"{}\"}}", self.code(), self.name());
        out
    }
}

/// Persisted restart record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RestartRecord {
    pub cause: RestartCause,
    /// Uptime right before the restart
    pub uptime_ms: u64,
}

/// Everything known at boot about the previous run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootInfo {
    /// Application-level record of the previous restart
    pub previous: RestartRecord,
    /// Platform reset reason of this boot
    pub reset_reason: &'static str,
    /// Boot counter value of this run (0 if storage is unavailable)
    pub run_counter: u32,
}

/// Read the record left by the previous run and invalidate it
///
/// Returns `NoError` on a first boot, `ExternalReset` if the previous run
/// ended without a controlled restart, and the stored record otherwise.
pub fn read_last_restart_info<R: StateRepository>(repository: &mut R) -> RestartRecord {
    let record = match repository.load_restart() {
        Ok(Some(record)) if record.cause == RestartCause::NoError => RestartRecord {
            cause: RestartCause::ExternalReset,
            uptime_ms: 0,
        },
        Ok(Some(record)) => record,
        Ok(None) => RestartRecord::default(),
        Err(e) => {
            log_warn!("Restart record unreadable: {:?}", e);
            RestartRecord::default()
        }
    };

    if let Err(e) = repository.save_restart(&RestartRecord::default()) {
        log_warn!("Restart record not cleared: {:?}", e);
    }
    log_info!(
        "Previous restart: {} after {} ms",
        record.cause.name(),
        record.uptime_ms
    );
    record
}

/// Persist a restart record
pub fn record_restart<R: StateRepository>(
    repository: &mut R,
    cause: RestartCause,
    uptime_ms: u64,
) -> Result<(), RepositoryError> {
    repository.save_restart(&RestartRecord { cause, uptime_ms })
}

/// Persist the cause and restart
///
/// A failed write is logged and the restart happens anyway.
pub fn record_and_restart<R, S>(
    repository: &mut R,
    system: &mut S,
    cause: RestartCause,
    uptime_ms: u64,
) -> !
where
    R: StateRepository,
    S: SystemControl,
{
    log_error!("Restarting: {} after {} ms", cause.name(), uptime_ms);
    if let Err(e) = record_restart(repository, cause, uptime_ms) {
        log_error!("Restart record not saved: {:?}", e);
    }
    system.restart()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        for code in 0..=255u8 {
            assert_eq!(RestartCause::from_code(code).code(), code);
        }
        assert_eq!(RestartCause::from_code(5), RestartCause::UpdateFailure);
        assert_eq!(RestartCause::from_code(42).name(), "UNKNOWN");
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            RestartCause::RemoteReset.describe().as_str(),
            "{code:3,descr:\"MQTT_RESET_REQUEST\"}"
        );
        assert_eq!(
            RestartCause::Other(200).describe().as_str(),
            "{code:200,descr:\"UNKNOWN\"}"
        );
    }
}
