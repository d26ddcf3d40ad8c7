//! Power + direction relay motor
//!
//! The power relay feeds the motor, the direction relay routes the feed to
//! one of the two windings. The direction relay is only switched while the
//! power relay is open.

use roller_core::output::SwitchedOutput;
use roller_core::traits::{Direction, MotorActuator};
use roller_hal::OutputPin;

/// Motor with a power relay and a direction relay
///
/// The direction relay is closed for [`Direction::Down`].
pub struct PowerDirectionRelay<P: OutputPin> {
    power: SwitchedOutput<P>,
    direction: SwitchedOutput<P>,
}

impl<P: OutputPin> PowerDirectionRelay<P> {
    /// Create the actuator with both relays open
    pub fn new(mut power: SwitchedOutput<P>, mut direction: SwitchedOutput<P>) -> Self {
        power.turn_off();
        direction.turn_off();
        Self { power, direction }
    }

    fn direction(&self) -> Direction {
        if self.direction.is_on() {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

impl<P: OutputPin> MotorActuator for PowerDirectionRelay<P> {
    fn engage(&mut self, direction: Direction) {
        if self.power.is_on() && self.direction() == direction {
            return;
        }
        self.power.turn_off();
        match direction {
            Direction::Up => self.direction.turn_off(),
            Direction::Down => self.direction.turn_on(),
        };
        self.power.turn_on();
    }

    fn disengage(&mut self) {
        self.power.turn_off();
        // Release the coil as well; nothing is routed without power
        self.direction.turn_off();
    }

    fn engaged(&self) -> Option<Direction> {
        self.power.is_on().then(|| self.direction())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roller_hal::mock::MockOutputPin;

    #[test]
    fn test_engage_sets_direction_then_power() {
        let power = MockOutputPin::new();
        let dir = MockOutputPin::new();
        let mut motor = PowerDirectionRelay::new(
            SwitchedOutput::new(power.clone(), false),
            SwitchedOutput::new(dir.clone(), false),
        );

        motor.engage(Direction::Down);
        assert!(power.level());
        assert!(dir.level());
        assert_eq!(motor.engaged(), Some(Direction::Down));

        motor.engage(Direction::Up);
        assert!(power.level());
        assert!(!dir.level());
        assert_eq!(motor.engaged(), Some(Direction::Up));

        motor.disengage();
        assert!(!power.level());
        assert_eq!(motor.engaged(), None);
    }

    #[test]
    fn test_repeat_engage_keeps_power() {
        let power = MockOutputPin::new();
        let mut motor = PowerDirectionRelay::new(
            SwitchedOutput::new(power.clone(), false),
            SwitchedOutput::new(MockOutputPin::new(), false),
        );
        motor.engage(Direction::Up);
        let writes = power.writes();
        motor.engage(Direction::Up);
        assert_eq!(power.writes(), writes);
    }
}
