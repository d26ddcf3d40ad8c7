//! Hardware configuration types
//!
//! These types define the pin assignment and motor wiring of a board.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{ConfigError, Polarity};

/// Highest GPIO number on the RP2040
pub const MAX_GPIO: u8 = 29;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create an inverted input with the pull-up enabled
    ///
    /// The usual wiring for a switch to ground.
    pub const fn switch_to_ground(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }

    /// Parse a pin string like `"gpio11"`, `"!gpio12"` or `"^!gpio5"`
    ///
    /// `!` marks the pin active-low and `^` enables the pull-up; the
    /// modifiers may appear in either order.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let mut rest = s.trim();
        let mut inverted = false;
        let mut pull_up = false;
        loop {
            if let Some(r) = rest.strip_prefix('!') {
                inverted = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix('^') {
                pull_up = true;
                rest = r;
            } else {
                break;
            }
        }

        let number = rest.strip_prefix("gpio").ok_or(ConfigError::Invalid)?;
        let pin: u8 = number.parse().map_err(|_| ConfigError::Invalid)?;
        if pin > MAX_GPIO {
            return Err(ConfigError::OutOfRange);
        }
        Ok(Self {
            pin,
            inverted,
            pull_up,
        })
    }
}

/// How the motor relays are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotorWiring {
    /// One relay per direction
    #[default]
    DualRelay,
    /// One relay switching power, one selecting the direction
    PowerDirection,
}

impl MotorWiring {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim() {
            "dual_relay" => Ok(MotorWiring::DualRelay),
            "power_direction" => Ok(MotorWiring::PowerDirection),
            _ => Err(ConfigError::Invalid),
        }
    }
}

/// Board pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HardwareConfig {
    pub wiring: MotorWiring,
    /// Up relay (dual relay) or power relay (power/direction)
    pub relay_a: PinConfig,
    /// Down relay (dual relay) or direction relay (power/direction)
    pub relay_b: PinConfig,
    /// Auxiliary (audio) relay
    pub audio_relay: PinConfig,
    /// End-of-travel sensor
    pub end_sensor: PinConfig,
    /// Push button
    pub button: PinConfig,
    /// Bridge UART TX
    pub bridge_tx: PinConfig,
    /// Bridge UART RX
    pub bridge_rx: PinConfig,
    /// Bridge UART baud rate
    pub bridge_baud: u32,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            wiring: MotorWiring::DualRelay,
            relay_a: PinConfig::new(16),
            relay_b: PinConfig::new(17),
            audio_relay: PinConfig::new(18),
            end_sensor: PinConfig::switch_to_ground(14),
            button: PinConfig::switch_to_ground(15),
            bridge_tx: PinConfig::new(0),
            bridge_rx: PinConfig::new(1),
            bridge_baud: 115_200,
        }
    }
}

impl HardwareConfig {
    /// Polarities of the directly handled pins
    pub fn polarity(&self) -> Polarity {
        Polarity {
            end_sensor_active_low: self.end_sensor.inverted,
            button_active_low: self.button.inverted,
            audio_active_low: self.audio_relay.inverted,
        }
    }

    /// Bridge UART bytes that can arrive in `ms` milliseconds
    ///
    /// 8N1 framing: ten bit times per byte, rounded up.
    pub fn bridge_bytes_in(&self, ms: u32) -> usize {
        let bits = u64::from(self.bridge_baud) * u64::from(ms);
        bits.div_ceil(10 * 1_000) as usize
    }

    /// Check that no GPIO is assigned twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = [
            self.relay_a.pin,
            self.relay_b.pin,
            self.audio_relay.pin,
            self.end_sensor.pin,
            self.button.pin,
            self.bridge_tx.pin,
            self.bridge_rx.pin,
        ];
        for (i, a) in pins.iter().enumerate() {
            if *a > MAX_GPIO {
                return Err(ConfigError::OutOfRange);
            }
            if pins[i + 1..].contains(a) {
                return Err(ConfigError::Invalid);
            }
        }
        if self.bridge_baud == 0 {
            return Err(ConfigError::OutOfRange);
        }
        Ok(())
    }
}
