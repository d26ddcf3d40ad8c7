//! Relay-driven binary output
//!
//! The state reported by [`SwitchedOutput::state`] is the last commanded
//! one, not a sensed one. Every command rewrites the pin so an externally
//! disturbed relay is driven back, but a change is only reported when the
//! logical state actually differs.

use roller_hal::OutputPin;

use crate::input::SwitchState;

/// Binary output driving a relay
pub struct SwitchedOutput<P: OutputPin> {
    pin: P,
    active_low: bool,
    state: SwitchState,
}

impl<P: OutputPin> SwitchedOutput<P> {
    /// Create an output and drive it off
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut output = Self {
            pin,
            active_low,
            state: SwitchState::Off,
        };
        output.write(SwitchState::Off);
        output
    }

    fn write(&mut self, state: SwitchState) {
        self.pin.set_level(state.is_on() != self.active_low);
    }

    /// Drive the output to `state`
    ///
    /// Returns the new state if it differs from the previous one.
    pub fn set_state(&mut self, state: SwitchState) -> Option<SwitchState> {
        self.write(state);
        if self.state == state {
            return None;
        }
        self.state = state;
        Some(state)
    }

    pub fn turn_on(&mut self) -> Option<SwitchState> {
        self.set_state(SwitchState::On)
    }

    pub fn turn_off(&mut self) -> Option<SwitchState> {
        self.set_state(SwitchState::Off)
    }

    /// Invert the output, returning the new state
    pub fn toggle(&mut self) -> SwitchState {
        let next = self.state.toggled();
        self.set_state(next);
        next
    }

    /// Last commanded state
    pub fn state(&self) -> SwitchState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }
}
