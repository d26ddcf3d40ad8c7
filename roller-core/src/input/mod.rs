//! Digital inputs

mod debounce;

pub use debounce::DebouncedInput;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Binary logical state of a switch, button or relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SwitchState {
    #[default]
    Off,
    On,
}

/// State of the push button
pub type ButtonState = SwitchState;

impl SwitchState {
    pub fn from_bool(on: bool) -> Self {
        if on {
            SwitchState::On
        } else {
            SwitchState::Off
        }
    }

    pub fn is_on(self) -> bool {
        self == SwitchState::On
    }

    /// The opposite state
    pub fn toggled(self) -> Self {
        match self {
            SwitchState::Off => SwitchState::On,
            SwitchState::On => SwitchState::Off,
        }
    }
}
