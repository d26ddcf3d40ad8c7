//! Motor actuator trait
//!
//! A blind motor is driven by relays in one of a few wiring topologies
//! (see `roller-drivers`). The motion controller only needs to start the
//! motor in a direction and to cut it, so that is all this trait exposes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Travel direction of the blind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// The other direction
    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Relay-driven motor
///
/// Implementations must never energise both directions at once. Callers
/// are expected to `disengage` and wait for the relays to settle before
/// engaging the opposite direction; implementations still release the
/// opposite relay first on `engage`.
pub trait MotorActuator {
    /// Start driving the motor in `direction`
    fn engage(&mut self, direction: Direction);

    /// Cut power to the motor
    ///
    /// Always safe to call, including when already disengaged.
    fn disengage(&mut self);

    /// Direction currently being driven, if any
    fn engaged(&self) -> Option<Direction>;
}
