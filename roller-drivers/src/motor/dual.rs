//! Dual relay motor
//!
//! One relay per direction. Engaging a direction always releases the
//! opposite relay before closing its own, so both are never closed at the
//! same time even if a caller skips `disengage`.

use roller_core::output::SwitchedOutput;
use roller_core::traits::{Direction, MotorActuator};
use roller_hal::OutputPin;

/// Motor with an up relay and a down relay
pub struct DualRelay<P: OutputPin> {
    up: SwitchedOutput<P>,
    down: SwitchedOutput<P>,
}

impl<P: OutputPin> DualRelay<P> {
    /// Create the actuator with both relays open
    pub fn new(mut up: SwitchedOutput<P>, mut down: SwitchedOutput<P>) -> Self {
        up.turn_off();
        down.turn_off();
        Self { up, down }
    }
}

impl<P: OutputPin> MotorActuator for DualRelay<P> {
    fn engage(&mut self, direction: Direction) {
        let (on, off) = match direction {
            Direction::Up => (&mut self.up, &mut self.down),
            Direction::Down => (&mut self.down, &mut self.up),
        };
        off.turn_off();
        on.turn_on();
    }

    fn disengage(&mut self) {
        self.up.turn_off();
        self.down.turn_off();
    }

    fn engaged(&self) -> Option<Direction> {
        match (self.up.is_on(), self.down.is_on()) {
            (true, false) => Some(Direction::Up),
            (false, true) => Some(Direction::Down),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roller_hal::mock::MockOutputPin;

    fn motor() -> (DualRelay<MockOutputPin>, MockOutputPin, MockOutputPin) {
        let up = MockOutputPin::new();
        let down = MockOutputPin::new();
        let motor = DualRelay::new(
            SwitchedOutput::new(up.clone(), false),
            SwitchedOutput::new(down.clone(), false),
        );
        (motor, up, down)
    }

    #[test]
    fn test_engage_directions() {
        let (mut motor, up, down) = motor();
        motor.engage(Direction::Up);
        assert!(up.level());
        assert!(!down.level());
        assert_eq!(motor.engaged(), Some(Direction::Up));

        motor.engage(Direction::Down);
        assert!(!up.level());
        assert!(down.level());
        assert_eq!(motor.engaged(), Some(Direction::Down));
    }

    #[test]
    fn test_disengage_opens_both() {
        let (mut motor, up, down) = motor();
        motor.engage(Direction::Up);
        motor.disengage();
        assert!(!up.level());
        assert!(!down.level());
        assert_eq!(motor.engaged(), None);
    }

    #[test]
    fn test_active_low_relays() {
        let up = MockOutputPin::new();
        let down = MockOutputPin::new();
        let mut motor = DualRelay::new(
            SwitchedOutput::new(up.clone(), true),
            SwitchedOutput::new(down.clone(), true),
        );
        assert!(up.level() && down.level());
        motor.engage(Direction::Down);
        assert!(up.level());
        assert!(!down.level());
    }
}
