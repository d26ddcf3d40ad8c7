//! Topic table
//!
//! Every topic the controller publishes or subscribes to, derived once
//! from the configured prefix.

use core::fmt::Write;

use heapless::String;

use super::types::ConfigError;
use crate::traits::transport::MAX_TOPIC_LEN;

/// Topic buffer
pub type Topic = String<MAX_TOPIC_LEN>;

/// Payload of the status topic while connected
pub const STATUS_ONLINE: &str = "online";

/// Last-will payload of the status topic
pub const STATUS_OFFLINE: &str = "offline";

/// All topics of one device
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Topics {
    /// `online` / `offline`, retained, also the last will
    pub status: Topic,
    /// Firmware version, retained
    pub version: Topic,
    pub blinds_state: Topic,
    pub blinds_set: Topic,
    pub button_state: Topic,
    pub audio_state: Topic,
    pub audio_set: Topic,
    pub restart: Topic,
    /// Platform reset reason
    pub restart_reason_platform: Topic,
    pub restart_reason_uptime: Topic,
    pub restart_reason_code: Topic,
    pub restart_reason_sw: Topic,
    pub restart_reason_run_id: Topic,
}

fn topic(prefix: &str, suffix: &str) -> Result<Topic, ConfigError> {
    let mut t = Topic::new();
    write!(t, "{}{}", prefix, suffix).map_err(|_| ConfigError::TooLong)?;
    Ok(t)
}

impl Topics {
    /// Build the table for `prefix` (no trailing slash)
    pub fn new(prefix: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            status: topic(prefix, "/status")?,
            version: topic(prefix, "/version")?,
            blinds_state: topic(prefix, "/blinds/state")?,
            blinds_set: topic(prefix, "/blinds/state/set")?,
            button_state: topic(prefix, "/button_1/state")?,
            audio_state: topic(prefix, "/audio/state")?,
            audio_set: topic(prefix, "/audio/state/set")?,
            restart: topic(prefix, "/restart")?,
            restart_reason_platform: topic(prefix, "/restart_reason/0")?,
            restart_reason_uptime: topic(prefix, "/restart_reason/uptime")?,
            restart_reason_code: topic(prefix, "/restart_reason/code")?,
            restart_reason_sw: topic(prefix, "/restart_reason/sw")?,
            restart_reason_run_id: topic(prefix, "/restart_reason/run_id")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::MAX_PREFIX_LEN;

    #[test]
    fn test_topics_from_prefix() {
        let topics = Topics::new("dev/roller-02").unwrap();
        assert_eq!(topics.blinds_set.as_str(), "dev/roller-02/blinds/state/set");
        assert_eq!(
            topics.restart_reason_run_id.as_str(),
            "dev/roller-02/restart_reason/run_id"
        );
    }

    #[test]
    fn test_longest_prefix_fits() {
        let prefix = [b'p'; MAX_PREFIX_LEN];
        let prefix = core::str::from_utf8(&prefix).unwrap();
        assert!(Topics::new(prefix).is_ok());

        let too_long = [b'p'; MAX_TOPIC_LEN];
        let too_long = core::str::from_utf8(&too_long).unwrap();
        assert_eq!(Topics::new(too_long), Err(ConfigError::TooLong));
    }
}
