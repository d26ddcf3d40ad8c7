//! Blinds motion state machine
//!
//! Drives a [`MotorActuator`] from direction commands and watches a single
//! debounced end-of-travel sensor shared by both ends of the travel.
//!
//! # State transitions
//!
//! ```text
//!            push_up                    sensor triggers
//!   any ─────────────────► RollingUp ─────────────────► FullUp
//!                              │
//!                              │ no sensor within timeout
//!                              ▼
//!                          Obstructed
//!
//!   (push_down / RollingDown / FullDown symmetric; stop ─► Stopped)
//! ```
//!
//! Every change of direction first releases the motor and blocks for the
//! relay settle time before the new direction is engaged.

use embedded_hal::delay::DelayNs;
use roller_hal::InputPin;

use super::{Direction, MotionState};
use crate::input::{DebouncedInput, SwitchState};
use crate::traits::MotorActuator;

/// Motion timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Time both relays are held off before a direction is engaged
    pub settle_ms: u32,
    /// Maximum rolling time before the blind is considered obstructed
    pub obstruction_timeout_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            settle_ms: 300,
            obstruction_timeout_ms: 60_000,
        }
    }
}

/// Blinds motion controller
pub struct BlindsController<A, E, D>
where
    A: MotorActuator,
    E: InputPin,
    D: DelayNs,
{
    actuator: A,
    end_sensor: DebouncedInput<E>,
    delay: D,
    config: MotionConfig,
    state: MotionState,
    /// Set exactly while the state is rolling
    rolling_since: Option<u64>,
    last_direction: Option<Direction>,
}

impl<A, E, D> BlindsController<A, E, D>
where
    A: MotorActuator,
    E: InputPin,
    D: DelayNs,
{
    /// Create a controller with the motor released and the state unknown
    pub fn new(
        mut actuator: A,
        end_sensor: DebouncedInput<E>,
        delay: D,
        config: MotionConfig,
    ) -> Self {
        actuator.disengage();
        Self {
            actuator,
            end_sensor,
            delay,
            config,
            state: MotionState::Unknown,
            rolling_since: None,
            last_direction: None,
        }
    }

    /// Adopt a persisted state without moving the motor
    ///
    /// A rolling state cannot be trusted after a restart and becomes
    /// [`MotionState::Unknown`].
    pub fn restore(&mut self, state: MotionState) {
        self.state = if state.is_rolling() {
            MotionState::Unknown
        } else {
            state
        };
        self.last_direction = match self.state {
            MotionState::FullUp => Some(Direction::Up),
            MotionState::FullDown => Some(Direction::Down),
            _ => None,
        };
        log_info!("Blinds state restored: {:?}", self.state);
    }

    /// Start rolling up
    ///
    /// No-op when already rolling up or fully up.
    pub fn push_up(&mut self, now_ms: u64) -> Option<MotionState> {
        self.push(Direction::Up, now_ms)
    }

    /// Start rolling down
    ///
    /// No-op when already rolling down or fully down.
    pub fn push_down(&mut self, now_ms: u64) -> Option<MotionState> {
        self.push(Direction::Down, now_ms)
    }

    fn push(&mut self, direction: Direction, now_ms: u64) -> Option<MotionState> {
        if self.state == direction.rolling_state() || self.state == direction.end_state() {
            return None;
        }

        self.actuator.disengage();
        self.delay.delay_ms(self.config.settle_ms);

        let changed = self.set_state(direction.rolling_state());
        self.rolling_since = Some(now_ms);
        self.last_direction = Some(direction);
        self.actuator.engage(direction);
        changed
    }

    /// Stop the motor wherever it is
    pub fn stop(&mut self) -> Option<MotionState> {
        self.actuator.disengage();
        self.rolling_since = None;
        self.set_state(MotionState::Stopped)
    }

    /// Single-button control
    ///
    /// Stops a rolling blind, sends a blind at one end to the other, and
    /// otherwise reverses the last commanded direction (up if none).
    pub fn cycle(&mut self, now_ms: u64) -> Option<MotionState> {
        match self.state {
            MotionState::RollingUp | MotionState::RollingDown => self.stop(),
            MotionState::FullUp => self.push_down(now_ms),
            MotionState::FullDown => self.push_up(now_ms),
            _ => {
                let direction = self
                    .last_direction
                    .map_or(Direction::Up, Direction::reversed);
                self.push(direction, now_ms)
            }
        }
    }

    /// Evaluate the end-of-travel sensor and the obstruction timeout
    pub fn poll(&mut self, now_ms: u64) -> Option<MotionState> {
        if self.end_sensor.poll(now_ms) == Some(SwitchState::On) {
            self.actuator.disengage();
            self.rolling_since = None;
            return match self.state {
                MotionState::RollingUp => self.set_state(MotionState::FullUp),
                MotionState::RollingDown => self.set_state(MotionState::FullDown),
                _ => None,
            };
        }

        let since = self.rolling_since?;
        if now_ms.saturating_sub(since) < self.config.obstruction_timeout_ms {
            return None;
        }

        log_warn!(
            "Blinds obstructed: {:?} for {} ms",
            self.state,
            now_ms.saturating_sub(since)
        );
        self.actuator.disengage();
        self.rolling_since = None;
        self.set_state(MotionState::Obstructed)
    }

    fn set_state(&mut self, state: MotionState) -> Option<MotionState> {
        if self.state == state {
            return None;
        }
        log_info!("Blinds: {:?} -> {:?}", self.state, state);
        self.state = state;
        Some(state)
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Time the current roll started, if rolling
    pub fn rolling_since(&self) -> Option<u64> {
        self.rolling_since
    }

    /// Direction of the most recent roll
    pub fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    /// Debounced end-of-travel sensor state
    pub fn end_sensor(&self) -> SwitchState {
        self.end_sensor.state()
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use roller_hal::mock::{MockDelay, MockInputPin};

    /// Actuator that remembers the engaged direction
    #[derive(Default)]
    struct FakeActuator {
        engaged: Option<Direction>,
        disengages: Cell<u32>,
    }

    impl MotorActuator for FakeActuator {
        fn engage(&mut self, direction: Direction) {
            assert!(self.engaged.is_none(), "engaged without release");
            self.engaged = Some(direction);
        }

        fn disengage(&mut self) {
            self.engaged = None;
            self.disengages.set(self.disengages.get() + 1);
        }

        fn engaged(&self) -> Option<Direction> {
            self.engaged
        }
    }

    fn controller() -> (
        BlindsController<FakeActuator, MockInputPin, MockDelay>,
        MockInputPin,
        MockDelay,
    ) {
        let sensor = MockInputPin::new(false);
        let delay = MockDelay::new();
        let ctrl = BlindsController::new(
            FakeActuator::default(),
            DebouncedInput::new(sensor.clone(), 50, false),
            delay.clone(),
            MotionConfig::default(),
        );
        (ctrl, sensor, delay)
    }

    #[test]
    fn test_push_up_engages_after_settle() {
        let (mut ctrl, _, delay) = controller();
        assert_eq!(ctrl.push_up(1000), Some(MotionState::RollingUp));
        assert_eq!(ctrl.actuator().engaged(), Some(Direction::Up));
        assert_eq!(ctrl.rolling_since(), Some(1000));
        assert_eq!(delay.total_ms(), 300);
    }

    #[test]
    fn test_push_up_idempotent() {
        let (mut ctrl, _, delay) = controller();
        ctrl.push_up(0);
        assert_eq!(ctrl.push_up(10), None);
        assert_eq!(ctrl.rolling_since(), Some(0));
        assert_eq!(delay.calls(), 1);
    }

    #[test]
    fn test_end_sensor_resolves_direction() {
        let (mut ctrl, sensor, _) = controller();
        ctrl.push_down(0);
        sensor.set_high(true);
        assert_eq!(ctrl.poll(100), None);
        assert_eq!(ctrl.poll(150), Some(MotionState::FullDown));
        assert_eq!(ctrl.actuator().engaged(), None);
        assert_eq!(ctrl.rolling_since(), None);

        // Already at the bottom
        assert_eq!(ctrl.push_down(200), None);
    }

    #[test]
    fn test_obstruction_after_timeout() {
        let (mut ctrl, _, _) = controller();
        ctrl.push_up(1000);
        assert_eq!(ctrl.poll(60_999), None);
        assert_eq!(ctrl.poll(61_000), Some(MotionState::Obstructed));
        assert_eq!(ctrl.actuator().engaged(), None);
        assert_eq!(ctrl.poll(70_000), None);
    }

    #[test]
    fn test_sensor_while_stopped_only_releases() {
        let (mut ctrl, sensor, _) = controller();
        ctrl.stop();
        sensor.set_high(true);
        ctrl.poll(0);
        assert_eq!(ctrl.poll(50), None);
        assert_eq!(ctrl.state(), MotionState::Stopped);
    }

    #[test]
    fn test_reversal_releases_first() {
        let (mut ctrl, _, delay) = controller();
        ctrl.push_up(0);
        assert_eq!(ctrl.push_down(100), Some(MotionState::RollingDown));
        assert_eq!(ctrl.actuator().engaged(), Some(Direction::Down));
        assert_eq!(delay.total_ms(), 600);
    }

    #[test]
    fn test_restore_rolling_becomes_unknown() {
        let (mut ctrl, _, _) = controller();
        ctrl.restore(MotionState::RollingDown);
        assert_eq!(ctrl.state(), MotionState::Unknown);
        ctrl.restore(MotionState::FullDown);
        assert_eq!(ctrl.state(), MotionState::FullDown);
        assert_eq!(ctrl.actuator().engaged(), None);
    }

    #[test]
    fn test_cycle() {
        let (mut ctrl, _, _) = controller();
        assert_eq!(ctrl.cycle(0), Some(MotionState::RollingUp));
        assert_eq!(ctrl.cycle(10), Some(MotionState::Stopped));
        assert_eq!(ctrl.cycle(20), Some(MotionState::RollingDown));

        ctrl.stop();
        ctrl.restore(MotionState::FullDown);
        assert_eq!(ctrl.cycle(30), Some(MotionState::RollingUp));
    }
}
