//! Blinds motion
//!
//! [`MotionState`] is the externally visible state of the blind and
//! [`BlindsController`] the state machine that drives the motor towards it.

mod controller;

pub use crate::traits::Direction;
pub use controller::{BlindsController, MotionConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State of the blind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotionState {
    /// Position not known (fresh boot, or interrupted while rolling)
    #[default]
    Unknown,
    RollingUp,
    RollingDown,
    /// Stopped somewhere between the ends
    Stopped,
    FullUp,
    FullDown,
    /// Rolled for too long without reaching an end
    Obstructed,
}

impl MotionState {
    /// Whether the motor is being driven
    pub fn is_rolling(self) -> bool {
        matches!(self, MotionState::RollingUp | MotionState::RollingDown)
    }

    /// Whether the state is still valid after a power cycle
    pub fn is_resting(self) -> bool {
        matches!(
            self,
            MotionState::Stopped
                | MotionState::FullUp
                | MotionState::FullDown
                | MotionState::Obstructed
        )
    }

    /// Wire name published on the state topic
    pub fn as_str(self) -> &'static str {
        match self {
            MotionState::Unknown => "Unknown",
            MotionState::RollingUp => "RollingUp",
            MotionState::RollingDown => "RollingDown",
            MotionState::Stopped => "Stopped",
            MotionState::FullUp => "FullUp",
            MotionState::FullDown => "FullDown",
            MotionState::Obstructed => "Obstructed",
        }
    }

    /// Parse a wire name
    pub fn from_name(name: &str) -> Option<Self> {
        [
            MotionState::Unknown,
            MotionState::RollingUp,
            MotionState::RollingDown,
            MotionState::Stopped,
            MotionState::FullUp,
            MotionState::FullDown,
            MotionState::Obstructed,
        ]
        .into_iter()
        .find(|s| s.as_str() == name)
    }
}

impl Direction {
    /// Rolling state for this direction
    pub fn rolling_state(self) -> MotionState {
        match self {
            Direction::Up => MotionState::RollingUp,
            Direction::Down => MotionState::RollingDown,
        }
    }

    /// End state reached when travelling in this direction
    pub fn end_state(self) -> MotionState {
        match self {
            Direction::Up => MotionState::FullUp,
            Direction::Down => MotionState::FullDown,
        }
    }
}
