//! Queued message type

use heapless::{String, Vec};

use crate::traits::transport::{MAX_PAYLOAD_LEN, MAX_TOPIC_LEN};

/// Reasons a message is refused by the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// Queue is at capacity
    Full,
    /// Topic longer than the transport allows
    TopicTooLong,
    /// Payload longer than the transport allows
    PayloadTooLarge,
}

/// Message waiting for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutboundMessage {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
    pub retained: bool,
    /// Deadline (ms); the message is discarded unsent once it has passed
    pub expires_at: Option<u64>,
    /// Failed attempts so far
    pub retry_count: u8,
}

impl OutboundMessage {
    pub fn new(
        topic: &str,
        payload: &[u8],
        retained: bool,
        expires_at: Option<u64>,
    ) -> Result<Self, QueueError> {
        let mut t = String::new();
        t.push_str(topic).map_err(|_| QueueError::TopicTooLong)?;
        let payload = Vec::from_slice(payload).map_err(|_| QueueError::PayloadTooLarge)?;
        Ok(Self {
            topic: t,
            payload,
            retained,
            expires_at,
            retry_count: 0,
        })
    }

    /// Whether the deadline has passed at `now_ms`
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at.is_some_and(|deadline| now_ms > deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_oversized_fields() {
        let long = [b'a'; MAX_TOPIC_LEN + 1];
        let long = core::str::from_utf8(&long).unwrap();
        assert_eq!(
            OutboundMessage::new(long, b"1", false, None),
            Err(QueueError::TopicTooLong)
        );
        assert_eq!(
            OutboundMessage::new("t", &[0; MAX_PAYLOAD_LEN + 1], false, None),
            Err(QueueError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_expiry_is_strictly_after_deadline() {
        let msg = OutboundMessage::new("t", b"1", false, Some(100)).unwrap();
        assert!(!msg.is_expired(100));
        assert!(msg.is_expired(101));

        let forever = OutboundMessage::new("t", b"1", false, None).unwrap();
        assert!(!forever.is_expired(u64::MAX));
    }
}
