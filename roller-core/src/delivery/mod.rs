//! Outbound message delivery
//!
//! A bounded FIFO of messages waiting for the bus. Messages that the
//! transport refuses are retried on later passes up to [`MAX_RETRIES`]
//! times, then dropped; messages past their deadline are dropped unsent.

mod message;
mod queue;

pub use message::{OutboundMessage, QueueError};
pub use queue::{DrainReport, MessageQueue};

/// Retries after the first failed attempt before a message is dropped
pub const MAX_RETRIES: u8 = 3;

/// Default queue capacity
pub const DEFAULT_CAPACITY: usize = 100;
