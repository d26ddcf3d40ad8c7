//! Debounced digital input
//!
//! Filters a raw, possibly bouncing pin into a stable [`SwitchState`]. A new
//! level is only accepted after it has been observed continuously for the
//! stability threshold; any return to the stable level in between restarts
//! the timer from scratch.

use roller_hal::InputPin;

use super::SwitchState;

/// Debounced digital input
pub struct DebouncedInput<P: InputPin> {
    pin: P,
    active_low: bool,
    threshold_ms: u64,
    stable: SwitchState,
    /// Time the current candidate level was first seen
    candidate_since: Option<u64>,
}

impl<P: InputPin> DebouncedInput<P> {
    /// Create a debounced input
    ///
    /// The stable state starts at whatever the pin reads right now, so no
    /// change is reported for the level present at start-up.
    ///
    /// # Arguments
    /// * `pin` - Raw input
    /// * `threshold_ms` - Time a new level must persist before it is accepted
    /// * `active_low` - `true` if a low level means [`SwitchState::On`]
    pub fn new(pin: P, threshold_ms: u64, active_low: bool) -> Self {
        let mut input = Self {
            pin,
            active_low,
            threshold_ms,
            stable: SwitchState::Off,
            candidate_since: None,
        };
        input.stable = input.sample();
        input
    }

    /// Logical level of the pin right now, without debouncing
    fn sample(&self) -> SwitchState {
        SwitchState::from_bool(self.pin.is_high() != self.active_low)
    }

    /// Sample the pin
    ///
    /// Returns the new stable state exactly once per accepted transition.
    pub fn poll(&mut self, now_ms: u64) -> Option<SwitchState> {
        let raw = self.sample();
        if raw == self.stable {
            self.candidate_since = None;
            return None;
        }

        let since = *self.candidate_since.get_or_insert(now_ms);
        if now_ms.saturating_sub(since) < self.threshold_ms {
            return None;
        }

        self.stable = raw;
        self.candidate_since = None;
        Some(raw)
    }

    /// Last accepted state
    pub fn state(&self) -> SwitchState {
        self.stable
    }

    /// Whether a change is pending but not yet accepted
    pub fn is_settling(&self) -> bool {
        self.candidate_since.is_some()
    }
}
