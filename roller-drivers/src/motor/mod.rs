//! Relay motor actuators
//!
//! Two wiring topologies are supported:
//!
//! - [`DualRelay`]: one relay per direction
//! - [`PowerDirectionRelay`]: one relay switches power, a second one
//!   selects the direction
//!
//! [`RelayMotor`] wraps both so the board picks the topology at start-up
//! from configuration while the motion controller sees one type.

pub mod dual;
pub mod power_dir;

pub use dual::DualRelay;
pub use power_dir::PowerDirectionRelay;

use roller_core::config::MotorWiring;
use roller_core::output::SwitchedOutput;
use roller_core::traits::{Direction, MotorActuator};
use roller_hal::OutputPin;

/// Relay motor in either wiring topology
pub enum RelayMotor<P: OutputPin> {
    Dual(DualRelay<P>),
    PowerDirection(PowerDirectionRelay<P>),
}

impl<P: OutputPin> RelayMotor<P> {
    /// One relay per direction
    pub fn dual(up: SwitchedOutput<P>, down: SwitchedOutput<P>) -> Self {
        RelayMotor::Dual(DualRelay::new(up, down))
    }

    /// Power relay plus direction relay
    pub fn power_direction(power: SwitchedOutput<P>, direction: SwitchedOutput<P>) -> Self {
        RelayMotor::PowerDirection(PowerDirectionRelay::new(power, direction))
    }

    /// Build the topology named by `wiring`
    ///
    /// `a` is the up (dual) or power relay, `b` the down (dual) or
    /// direction relay.
    pub fn from_wiring(wiring: MotorWiring, a: SwitchedOutput<P>, b: SwitchedOutput<P>) -> Self {
        match wiring {
            MotorWiring::DualRelay => Self::dual(a, b),
            MotorWiring::PowerDirection => Self::power_direction(a, b),
        }
    }

    pub fn wiring(&self) -> MotorWiring {
        match self {
            RelayMotor::Dual(_) => MotorWiring::DualRelay,
            RelayMotor::PowerDirection(_) => MotorWiring::PowerDirection,
        }
    }
}

impl<P: OutputPin> MotorActuator for RelayMotor<P> {
    fn engage(&mut self, direction: Direction) {
        match self {
            RelayMotor::Dual(m) => m.engage(direction),
            RelayMotor::PowerDirection(m) => m.engage(direction),
        }
    }

    fn disengage(&mut self) {
        match self {
            RelayMotor::Dual(m) => m.disengage(),
            RelayMotor::PowerDirection(m) => m.disengage(),
        }
    }

    fn engaged(&self) -> Option<Direction> {
        match self {
            RelayMotor::Dual(m) => m.engaged(),
            RelayMotor::PowerDirection(m) => m.engaged(),
        }
    }
}
