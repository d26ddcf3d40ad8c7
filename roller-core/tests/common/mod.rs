//! Shared test doubles for the control loop

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use roller_core::app::App;
use roller_core::config::DeviceConfig;
use roller_core::input::SwitchState;
use roller_core::motion::MotionState;
use roller_core::restart::RestartRecord;
use roller_core::traits::{
    Board, ConnectOptions, Direction, InboundMessage, MotorActuator, Peripherals, QoS,
    RepositoryError, StateRepository, SwitchSlot, Transport,
};
use roller_hal::mock::{MockDelay, MockInputPin, MockOutputPin, MockSystem};
use roller_hal::StorageError;

/// Published message as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retained: bool,
}

impl Published {
    pub fn payload_str(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap()
    }
}

#[derive(Debug, Default)]
pub struct TransportState {
    pub connected: bool,
    pub session: u32,
    pub accept_connect: bool,
    /// Publishes the transport can buffer before refusing; `None` is unbounded
    pub capacity: Option<usize>,
    pub refuse_publish: bool,
    pub connects: u32,
    pub publish_attempts: u32,
    pub will: Option<(String, Vec<u8>)>,
    pub published: Vec<Published>,
    pub subscribed: Vec<(String, QoS)>,
    pub inbound: VecDeque<InboundMessage>,
}

/// In-memory bus with a shared handle
#[derive(Debug, Clone, Default)]
pub struct MockTransport(pub Rc<RefCell<TransportState>>);

impl MockTransport {
    pub fn online() -> Self {
        let t = Self::default();
        t.0.borrow_mut().accept_connect = true;
        t
    }

    pub fn push_inbound(&self, topic: &str, payload: &[u8]) {
        let msg = InboundMessage::new(topic, payload).unwrap();
        self.0.borrow_mut().inbound.push_back(msg);
    }

    pub fn published(&self) -> Vec<Published> {
        self.0.borrow().published.clone()
    }

    /// Payloads published on `topic`, oldest first
    pub fn payloads(&self, topic: &str) -> Vec<String> {
        self.0
            .borrow()
            .published
            .iter()
            .filter(|p| p.topic == topic)
            .map(|p| p.payload_str().to_string())
            .collect()
    }

    pub fn set_connected(&self, connected: bool) {
        let mut s = self.0.borrow_mut();
        if connected && !s.connected {
            s.session += 1;
        }
        s.connected = connected;
    }

    pub fn set_capacity(&self, capacity: Option<usize>) {
        self.0.borrow_mut().capacity = capacity;
    }
}

impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    fn session(&self) -> u32 {
        self.0.borrow().session
    }

    fn send_capacity(&self) -> usize {
        self.0.borrow().capacity.unwrap_or(usize::MAX)
    }

    fn connect(&mut self, options: &ConnectOptions<'_>) -> bool {
        let mut s = self.0.borrow_mut();
        s.connects += 1;
        s.will = Some((options.will_topic.to_string(), options.will_payload.to_vec()));
        if s.accept_connect && !s.connected {
            s.connected = true;
            s.session += 1;
        }
        s.connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool) -> bool {
        let mut s = self.0.borrow_mut();
        s.publish_attempts += 1;
        if s.refuse_publish || !s.connected || s.capacity == Some(0) {
            return false;
        }
        if let Some(capacity) = s.capacity.as_mut() {
            *capacity -= 1;
        }
        s.published.push(Published {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            retained,
        });
        true
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> bool {
        self.0.borrow_mut().subscribed.push((topic.to_string(), qos));
        true
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.0.borrow_mut().inbound.pop_front()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Stored {
    pub motion: Option<MotionState>,
    pub button: Option<SwitchState>,
    pub audio: Option<SwitchState>,
    pub restart: Option<RestartRecord>,
    pub run_counter: u32,
    pub fail: bool,
}

/// In-memory state repository with a shared handle
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository(pub Rc<RefCell<Stored>>);

impl MemoryRepository {
    pub fn stored(&self) -> Stored {
        self.0.borrow().clone()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.0.borrow().fail {
            Err(RepositoryError::Storage(StorageError::Flash))
        } else {
            Ok(())
        }
    }
}

impl StateRepository for MemoryRepository {
    fn load_motion(&mut self) -> Result<Option<MotionState>, RepositoryError> {
        self.check()?;
        Ok(self.0.borrow().motion)
    }

    fn save_motion(&mut self, state: MotionState) -> Result<(), RepositoryError> {
        self.check()?;
        self.0.borrow_mut().motion = Some(state);
        Ok(())
    }

    fn load_switch(&mut self, slot: SwitchSlot) -> Result<Option<SwitchState>, RepositoryError> {
        self.check()?;
        let s = self.0.borrow();
        Ok(match slot {
            SwitchSlot::Button => s.button,
            SwitchSlot::Audio => s.audio,
        })
    }

    fn save_switch(&mut self, slot: SwitchSlot, state: SwitchState) -> Result<(), RepositoryError> {
        self.check()?;
        let mut s = self.0.borrow_mut();
        match slot {
            SwitchSlot::Button => s.button = Some(state),
            SwitchSlot::Audio => s.audio = Some(state),
        }
        Ok(())
    }

    fn load_restart(&mut self) -> Result<Option<RestartRecord>, RepositoryError> {
        self.check()?;
        Ok(self.0.borrow().restart)
    }

    fn save_restart(&mut self, record: &RestartRecord) -> Result<(), RepositoryError> {
        self.check()?;
        self.0.borrow_mut().restart = Some(*record);
        Ok(())
    }

    fn bump_run_counter(&mut self) -> Result<u32, RepositoryError> {
        self.check()?;
        let mut s = self.0.borrow_mut();
        s.run_counter += 1;
        Ok(s.run_counter)
    }
}

#[derive(Debug, Default)]
pub struct ActuatorLog {
    pub engaged: Option<Direction>,
    pub engages: Vec<Direction>,
    /// Engage calls made while the other direction was still driven
    pub overlaps: u32,
}

/// Actuator double with a shared handle
#[derive(Debug, Clone, Default)]
pub struct MockActuator(pub Rc<RefCell<ActuatorLog>>);

impl MockActuator {
    pub fn engaged_now(&self) -> Option<Direction> {
        self.0.borrow().engaged
    }

    pub fn overlaps(&self) -> u32 {
        self.0.borrow().overlaps
    }
}

impl MotorActuator for MockActuator {
    fn engage(&mut self, direction: Direction) {
        let mut log = self.0.borrow_mut();
        if log.engaged.is_some_and(|d| d != direction) {
            log.overlaps += 1;
        }
        log.engaged = Some(direction);
        log.engages.push(direction);
    }

    fn disengage(&mut self) {
        self.0.borrow_mut().engaged = None;
    }

    fn engaged(&self) -> Option<Direction> {
        self.0.borrow().engaged
    }
}

pub struct TestBoard;

impl Board for TestBoard {
    type Actuator = MockActuator;
    type EndSensor = MockInputPin;
    type Button = MockInputPin;
    type AudioRelay = MockOutputPin;
    type Delay = MockDelay;
    type Transport = MockTransport;
    type Repository = MemoryRepository;
    type System = MockSystem;
}

/// App under test plus handles to all of its peripherals
pub struct Rig {
    pub app: App<TestBoard>,
    pub actuator: MockActuator,
    pub end_sensor: MockInputPin,
    pub button: MockInputPin,
    pub audio: MockOutputPin,
    pub delay: MockDelay,
    pub transport: MockTransport,
    pub repository: MemoryRepository,
    pub system: MockSystem,
}

pub const PREFIX: &str = "dev/roller";

pub fn topic(suffix: &str) -> String {
    format!("{PREFIX}{suffix}")
}

impl Rig {
    pub fn new(transport: MockTransport, repository: MemoryRepository) -> Self {
        let actuator = MockActuator::default();
        // Both inputs are switches to ground: high means released
        let end_sensor = MockInputPin::new(true);
        let button = MockInputPin::new(true);
        let audio = MockOutputPin::new();
        let delay = MockDelay::new();
        let system = MockSystem::default();

        let peripherals = Peripherals::<TestBoard> {
            actuator: actuator.clone(),
            end_sensor: end_sensor.clone(),
            button: button.clone(),
            audio_relay: audio.clone(),
            delay: delay.clone(),
            transport: transport.clone(),
            repository: repository.clone(),
            system: system.clone(),
        };
        let app = App::new(peripherals, DeviceConfig::default(), 0).unwrap();

        Self {
            app,
            actuator,
            end_sensor,
            button,
            audio,
            delay,
            transport,
            repository,
            system,
        }
    }

    pub fn online() -> Self {
        Self::new(MockTransport::online(), MemoryRepository::default())
    }

    /// Tick every 10 ms over `[from, to)`
    pub fn run(&mut self, from: u64, to: u64) {
        let mut t = from;
        while t < to {
            self.app.tick(t);
            t += 10;
        }
    }

    /// Tick once, returning `true` if the tick requested a restart
    pub fn tick_restarts(&mut self, now: u64) -> bool {
        catch_unwind(AssertUnwindSafe(|| self.app.tick(now))).is_err()
    }
}
