//! Message bus transport trait
//!
//! The bus client itself lives outside the controller (on the network
//! bridge in the firmware build). The core only needs best-effort publish,
//! subscribe, a connection flag and a way to pull inbound messages.

use heapless::{String, Vec};

/// Maximum topic length carried through the transport
pub const MAX_TOPIC_LEN: usize = 64;

/// Maximum payload length carried through the transport
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Delivery guarantee requested for a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
}

impl QoS {
    /// Numeric QoS level
    pub fn level(self) -> u8 {
        self as u8
    }

    /// QoS from its numeric level
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            _ => None,
        }
    }
}

/// Parameters of a connection attempt
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions<'a> {
    /// Client identifier presented to the broker
    pub client_id: &'a str,
    /// Topic of the last-will message
    pub will_topic: &'a str,
    /// Payload of the last-will message (retained)
    pub will_payload: &'a [u8],
}

/// Message received from the bus
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InboundMessage {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl InboundMessage {
    /// Build a message, truncating nothing
    ///
    /// Returns `None` if the topic or payload does not fit.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = String::new();
        t.push_str(topic).ok()?;
        let payload = Vec::from_slice(payload).ok()?;
        Some(Self { topic: t, payload })
    }
}

/// Best-effort message bus
pub trait Transport {
    /// Whether the bus session is currently up
    fn is_connected(&self) -> bool;

    /// Identifier of the current bus session
    ///
    /// Must change every time a new session comes up, so a drop and
    /// reconnect between two polls is still seen as a new session.
    fn session(&self) -> u32;

    /// Publishes that can be accepted right now without local backpressure
    ///
    /// A full local buffer is not a bus failure: messages beyond this
    /// count are held back instead of being offered and refused.
    fn send_capacity(&self) -> usize {
        usize::MAX
    }

    /// Attempt to (re)establish the bus session
    ///
    /// Must not block. Returns `true` if the session is up on return; a
    /// transport that connects asynchronously returns `false` and later
    /// reports the session through [`Transport::is_connected`].
    fn connect(&mut self, options: &ConnectOptions<'_>) -> bool;

    /// Publish a message; `true` if the transport accepted it
    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool) -> bool;

    /// Subscribe to a topic pattern; `true` if the request was accepted
    fn subscribe(&mut self, topic: &str, qos: QoS) -> bool;

    /// Next inbound message, if one is waiting
    fn poll_inbound(&mut self) -> Option<InboundMessage>;
}
