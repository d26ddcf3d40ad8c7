//! Roller bridge link protocol
//!
//! The controller has no network stack of its own. A companion bridge chip
//! owns the broker session and talks to the controller over a UART using
//! the framing defined here. The controller asks the bridge to connect,
//! publish and subscribe; the bridge reports link state, forwards inbound
//! messages and relays firmware update progress.
//!
//! # Frame layout
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–250B      │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! Strings inside payloads are length-prefixed with a single byte. A
//! trailing opaque body (publish payloads, inbound payloads) runs to the
//! end of the frame.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{BridgeMessage, ControllerMessage, UpdateEvent};
