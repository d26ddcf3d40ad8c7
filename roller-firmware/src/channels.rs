//! Inter-task communication channels
//!
//! The control loop is synchronous; the bridge tasks are async. These
//! statics are the only meeting point: the loop uses non-blocking
//! `try_send`/`try_receive`, the UART tasks await.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::{AtomicBool, AtomicU32};

use roller_core::traits::InboundMessage;
use roller_protocol::{Frame, UpdateEvent};

/// Frames waiting for the bridge UART
///
/// The control loop only offers as many queued messages per tick as
/// there are free slots here.
const OUTBOUND_DEPTH: usize = 16;

/// Inbound messages waiting for the control loop
const INBOUND_DEPTH: usize = 8;

/// Update events waiting for the control loop
const UPDATE_DEPTH: usize = 4;

/// Controller → bridge frames
pub static OUTBOUND: Channel<CriticalSectionRawMutex, Frame, OUTBOUND_DEPTH> = Channel::new();

/// Messages received on subscribed topics
pub static INBOUND: Channel<CriticalSectionRawMutex, InboundMessage, INBOUND_DEPTH> =
    Channel::new();

/// Firmware update progress from the bridge
pub static UPDATE_EVENTS: Channel<CriticalSectionRawMutex, UpdateEvent, UPDATE_DEPTH> =
    Channel::new();

/// Broker session state as last reported by the bridge
pub static LINK_UP: AtomicBool = AtomicBool::new(false);

/// Bumped each time the bridge reports a new broker session
pub static LINK_SESSION: AtomicU32 = AtomicU32::new(0);
