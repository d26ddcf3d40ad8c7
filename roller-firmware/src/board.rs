//! Board wiring: the concrete types behind the control loop

use core::sync::atomic::Ordering;

use defmt::*;

use roller_core::config::{HardwareConfig, PinConfig};
use roller_core::output::SwitchedOutput;
use roller_core::traits::{Board, ConnectOptions, InboundMessage, QoS, Transport};
use roller_drivers::motor::RelayMotor;
use roller_drivers::storage::KvStateRepository;
use roller_hal_rp2040::{BlockingDelay, FlashStore, PinBank, PinError, RpInput, RpOutput, RpSystem};
use roller_protocol::{ControllerMessage, FrameError};

use crate::channels::{INBOUND, LINK_SESSION, LINK_UP, OUTBOUND};

/// The RP2040 controller board
pub struct PicoBoard;

impl Board for PicoBoard {
    type Actuator = RelayMotor<RpOutput<'static>>;
    type EndSensor = RpInput<'static>;
    type Button = RpInput<'static>;
    type AudioRelay = RpOutput<'static>;
    type Delay = BlockingDelay;
    type Transport = BridgeTransport;
    type Repository = KvStateRepository<FlashStore<'static>>;
    type System = RpSystem;
}

/// Pins taken from the bank per `device.toml`
pub struct BoardPins {
    pub actuator: RelayMotor<RpOutput<'static>>,
    pub end_sensor: RpInput<'static>,
    pub button: RpInput<'static>,
    pub audio_relay: RpOutput<'static>,
}

fn relay(bank: &mut PinBank, pin: PinConfig) -> Result<SwitchedOutput<RpOutput<'static>>, PinError> {
    Ok(SwitchedOutput::new(RpOutput::new(bank.take(pin.pin)?), pin.inverted))
}

fn input(bank: &mut PinBank, pin: PinConfig) -> Result<RpInput<'static>, PinError> {
    Ok(RpInput::new(bank.take(pin.pin)?, pin.pull_up))
}

impl BoardPins {
    /// Take every configured pin
    ///
    /// Relay outputs are driven to their off level before the motor
    /// actuator is assembled.
    pub fn take(bank: &mut PinBank, hw: &HardwareConfig) -> Result<Self, PinError> {
        let a = relay(bank, hw.relay_a)?;
        let b = relay(bank, hw.relay_b)?;
        Ok(Self {
            actuator: RelayMotor::from_wiring(hw.wiring, a, b),
            end_sensor: input(bank, hw.end_sensor)?,
            button: input(bank, hw.button)?,
            audio_relay: RpOutput::new(bank.take(hw.audio_relay.pin)?),
        })
    }
}

/// [`Transport`] backed by the bridge co-processor
///
/// Requests are queued as frames for the bridge TX task. The session
/// comes up asynchronously: `connect` only sends the request and the
/// supervisor notices the link through `is_connected` and `session` once
/// the bridge reports it.
pub struct BridgeTransport;

impl BridgeTransport {
    fn send(&self, message: ControllerMessage<'_>) -> bool {
        match message.to_frame() {
            Ok(frame) => OUTBOUND.try_send(frame).is_ok(),
            Err(FrameError::PayloadTooLarge) => {
                warn!("Bridge request too large");
                false
            }
            Err(e) => {
                warn!("Bridge request not encoded: {:?}", e);
                false
            }
        }
    }
}

impl Transport for BridgeTransport {
    fn is_connected(&self) -> bool {
        LINK_UP.load(Ordering::Acquire)
    }

    fn session(&self) -> u32 {
        LINK_SESSION.load(Ordering::Acquire)
    }

    fn send_capacity(&self) -> usize {
        OUTBOUND.free_capacity()
    }

    fn connect(&mut self, options: &ConnectOptions<'_>) -> bool {
        let sent = self.send(ControllerMessage::Connect {
            client_id: options.client_id,
            will_topic: options.will_topic,
            will_payload: options.will_payload,
        });
        if !sent {
            debug!("Connect request not queued");
        }
        self.is_connected()
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool) -> bool {
        self.is_connected()
            && self.send(ControllerMessage::Publish {
                retained,
                topic,
                payload,
            })
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> bool {
        self.is_connected()
            && self.send(ControllerMessage::Subscribe {
                qos: qos.level(),
                topic,
            })
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        INBOUND.try_receive().ok()
    }
}
