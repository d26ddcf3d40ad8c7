//! Inbound and outbound payload codecs

use crate::input::SwitchState;
use crate::motion::Direction;

/// Blinds command received on the set topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlindsCommand {
    Move(Direction),
    Stop,
}

/// Parse a boolean-like payload
///
/// Compatibility shim for existing publishers, not a designed protocol:
/// `1`/`0` are exact; 2-3 byte payloads are decided by their second byte
/// (`n` on, `f` off); any 4 byte payload is on and any 5 byte payload is
/// off. Everything else yields `default`.
pub fn parse_bool_payload(payload: &[u8], default: bool) -> bool {
    match payload {
        [b'1'] => true,
        [b'0'] => false,
        [_, second] | [_, second, _] => match second {
            b'n' => true,
            b'f' => false,
            _ => default,
        },
        [_, _, _, _] => true,
        [_, _, _, _, _] => false,
        _ => default,
    }
}

/// Parse a blinds command: `u` up, `d` down, `s` stop
///
/// Only the first byte counts, so `up`, `down` and `stop` work too.
pub fn parse_blinds_command(payload: &[u8]) -> Option<BlindsCommand> {
    match payload.first()? {
        b'u' | b'U' => Some(BlindsCommand::Move(Direction::Up)),
        b'd' | b'D' => Some(BlindsCommand::Move(Direction::Down)),
        b's' | b'S' => Some(BlindsCommand::Stop),
        _ => None,
    }
}

/// Payload published for a switch state
pub fn switch_payload(state: SwitchState) -> &'static [u8] {
    match state {
        SwitchState::On => b"1",
        SwitchState::Off => b"0",
    }
}
