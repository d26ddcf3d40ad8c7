//! Motion controller driving real relay actuators

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use roller_core::input::DebouncedInput;
use roller_core::motion::{BlindsController, Direction, MotionConfig, MotionState};
use roller_core::output::SwitchedOutput;
use roller_core::traits::MotorActuator;
use roller_drivers::motor::RelayMotor;
use roller_hal::mock::{MockDelay, MockInputPin};
use roller_hal::OutputPin;

/// Pair of relay pins that counts every instant both were closed
#[derive(Clone)]
struct Interlock {
    levels: Rc<[Cell<bool>; 2]>,
    overlaps: Rc<Cell<u32>>,
}

impl Interlock {
    fn new() -> Self {
        Self {
            levels: Rc::new([Cell::new(false), Cell::new(false)]),
            overlaps: Rc::new(Cell::new(0)),
        }
    }

    fn pin(&self, index: usize) -> InterlockPin {
        InterlockPin {
            index,
            shared: self.clone(),
        }
    }

    fn level(&self, index: usize) -> bool {
        self.levels[index].get()
    }
}

struct InterlockPin {
    index: usize,
    shared: Interlock,
}

impl OutputPin for InterlockPin {
    fn set_high(&mut self) {
        self.shared.levels[self.index].set(true);
        if self.shared.levels[1 - self.index].get() {
            self.shared.overlaps.set(self.shared.overlaps.get() + 1);
        }
    }

    fn set_low(&mut self) {
        self.shared.levels[self.index].set(false);
    }

    fn is_set_high(&self) -> bool {
        self.shared.levels[self.index].get()
    }
}

type Controller = BlindsController<RelayMotor<InterlockPin>, MockInputPin, MockDelay>;

fn dual_relay_blinds(timeout_ms: u64) -> (Controller, Interlock, MockInputPin, MockDelay) {
    let relays = Interlock::new();
    let sensor = MockInputPin::new(false);
    let delay = MockDelay::new();
    let motor = RelayMotor::dual(
        SwitchedOutput::new(relays.pin(0), false),
        SwitchedOutput::new(relays.pin(1), false),
    );
    let blinds = BlindsController::new(
        motor,
        DebouncedInput::new(sensor.clone(), 50, false),
        delay.clone(),
        MotionConfig {
            settle_ms: 300,
            obstruction_timeout_ms: timeout_ms,
        },
    );
    (blinds, relays, sensor, delay)
}

#[test]
fn test_push_up_until_full_up() {
    let (mut blinds, relays, sensor, delay) = dual_relay_blinds(60_000);
    assert_eq!(blinds.state(), MotionState::Unknown);

    assert_eq!(blinds.push_up(0), Some(MotionState::RollingUp));
    assert_eq!(delay.total_ms(), 300);
    assert!(relays.level(0), "up relay closed");
    assert!(!relays.level(1), "down relay open");

    sensor.set_high(true);
    blinds.poll(100);
    assert_eq!(blinds.poll(150), Some(MotionState::FullUp));
    assert!(!relays.level(0));
    assert!(!relays.level(1));
}

#[test]
fn test_obstruction_opens_relays() {
    let (mut blinds, relays, _, _) = dual_relay_blinds(60_000);
    blinds.push_down(0);
    assert!(relays.level(1));
    assert_eq!(blinds.poll(60_000), Some(MotionState::Obstructed));
    assert!(!relays.level(0));
    assert!(!relays.level(1));
}

#[test]
fn test_power_direction_reversal() {
    let power = roller_hal::mock::MockOutputPin::new();
    let dir = roller_hal::mock::MockOutputPin::new();
    let motor = RelayMotor::power_direction(
        SwitchedOutput::new(power.clone(), false),
        SwitchedOutput::new(dir.clone(), false),
    );
    let mut blinds = BlindsController::new(
        motor,
        DebouncedInput::new(MockInputPin::new(false), 50, false),
        MockDelay::new(),
        MotionConfig::default(),
    );

    blinds.push_down(0);
    assert!(power.level() && dir.level());
    blinds.push_up(10);
    assert!(power.level());
    assert!(!dir.level());
    assert_eq!(blinds.actuator().engaged(), Some(Direction::Up));
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Up,
    Down,
    Stop,
    Cycle,
    Sensor(bool),
    Wait(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Up),
        Just(Op::Down),
        Just(Op::Stop),
        Just(Op::Cycle),
        any::<bool>().prop_map(Op::Sensor),
        (1u64..3_000).prop_map(Op::Wait),
    ]
}

proptest! {
    #[test]
    fn prop_relays_never_both_closed(ops in prop::collection::vec(op(), 1..100)) {
        let (mut blinds, relays, sensor, _) = dual_relay_blinds(10_000);
        let mut now = 0;

        for op in ops {
            match op {
                Op::Up => { blinds.push_up(now); }
                Op::Down => { blinds.push_down(now); }
                Op::Stop => { blinds.stop(); }
                Op::Cycle => { blinds.cycle(now); }
                Op::Sensor(high) => sensor.set_high(high),
                Op::Wait(ms) => now += ms,
            }
            blinds.poll(now);

            prop_assert_eq!(relays.overlaps.get(), 0);
            prop_assert!(!(relays.level(0) && relays.level(1)));
            if !blinds.state().is_rolling() {
                prop_assert!(!relays.level(0) && !relays.level(1));
            }
        }
    }
}
