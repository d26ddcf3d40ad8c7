//! Board bundle trait
//!
//! Aggregates every peripheral type the control loop needs behind one set
//! of associated types, so [`crate::app::App`] takes a single type
//! parameter and dispatch stays static.
//!
//! # Example
//!
//! ```ignore
//! struct PicoBoard;
//!
//! impl Board for PicoBoard {
//!     type Actuator = RelayMotor<RpOutput<'static>>;
//!     type EndSensor = RpInput<'static>;
//!     // ... other associated types
//! }
//! ```

use embedded_hal::delay::DelayNs;
use roller_hal::{InputPin, OutputPin, SystemControl};

use super::{MotorActuator, StateRepository, Transport};

/// Peripheral type bundle of a concrete board
pub trait Board {
    /// Blind motor relays
    type Actuator: MotorActuator;
    /// End-of-travel sensor input
    type EndSensor: InputPin;
    /// Push button input
    type Button: InputPin;
    /// Auxiliary (audio) relay output
    type AudioRelay: OutputPin;
    /// Blocking delay for relay settling and the update failure hold
    type Delay: DelayNs + Clone;
    /// Message bus
    type Transport: Transport;
    /// Persistent state
    type Repository: StateRepository;
    /// Watchdog and restart
    type System: SystemControl;
}

/// Concrete peripheral instances handed to the control loop
pub struct Peripherals<B: Board> {
    pub actuator: B::Actuator,
    pub end_sensor: B::EndSensor,
    pub button: B::Button,
    pub audio_relay: B::AudioRelay,
    pub delay: B::Delay,
    pub transport: B::Transport,
    pub repository: B::Repository,
    pub system: B::System,
}
