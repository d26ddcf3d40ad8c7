//! Bounded retrying message queue

use heapless::Deque;

use super::{OutboundMessage, QueueError, MAX_RETRIES};

/// Outcome of one drain pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrainReport {
    /// Accepted by the transport
    pub sent: usize,
    /// Refused and put back for a later pass
    pub retried: usize,
    /// Refused for the last time and discarded
    pub dropped: usize,
    /// Discarded unsent because the deadline passed
    pub expired: usize,
}

/// Bounded FIFO of outbound messages
///
/// Overflow rejects the new message; queued messages are never evicted.
pub struct MessageQueue<const N: usize> {
    messages: Deque<OutboundMessage, N>,
}

impl<const N: usize> Default for MessageQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MessageQueue<N> {
    pub const fn new() -> Self {
        Self {
            messages: Deque::new(),
        }
    }

    /// Append a message
    ///
    /// # Arguments
    /// * `expires_at` - Deadline in ms on the same clock later passed to
    ///   [`MessageQueue::drain`]; `None` never expires
    pub fn enqueue(
        &mut self,
        topic: &str,
        payload: &[u8],
        retained: bool,
        expires_at: Option<u64>,
    ) -> Result<(), QueueError> {
        if self.messages.is_full() {
            log_warn!("Queue full, rejecting message for {}", topic);
            return Err(QueueError::Full);
        }
        let message = OutboundMessage::new(topic, payload, retained, expires_at)?;
        self.messages
            .push_back(message)
            .map_err(|_| QueueError::Full)
    }

    /// Offer every queued message to `send` once
    ///
    /// Only the messages present when the pass starts are visited, and a
    /// refused message goes to the back of the queue, so nothing is
    /// attempted twice in one pass. Expired messages are discarded without
    /// calling `send`.
    pub fn drain<F>(&mut self, now_ms: u64, send: F) -> DrainReport
    where
        F: FnMut(&OutboundMessage) -> bool,
    {
        self.drain_up_to(now_ms, usize::MAX, send)
    }

    /// Offer at most `limit` of the oldest messages to `send` once
    ///
    /// Messages past the limit are not visited and keep no retry count.
    /// Queue order is unchanged apart from removed messages.
    pub fn drain_up_to<F>(&mut self, now_ms: u64, limit: usize, mut send: F) -> DrainReport
    where
        F: FnMut(&OutboundMessage) -> bool,
    {
        let mut report = DrainReport::default();
        let visit = self.messages.len().min(limit);
        let untouched = self.messages.len() - visit;

        for _ in 0..visit {
            let Some(mut message) = self.messages.pop_front() else {
                break;
            };

            if message.is_expired(now_ms) {
                log_debug!("Message for {} expired", message.topic.as_str());
                report.expired += 1;
                continue;
            }

            if send(&message) {
                report.sent += 1;
                continue;
            }

            message.retry_count += 1;
            if message.retry_count > MAX_RETRIES {
                log_warn!(
                    "Dropping message for {} after {} attempts",
                    message.topic.as_str(),
                    message.retry_count
                );
                report.dropped += 1;
                continue;
            }

            // A slot was freed by the pop above
            if self.messages.push_back(message).is_err() {
                report.dropped += 1;
            } else {
                report.retried += 1;
            }
        }

        // Refused messages were appended behind the unvisited ones
        for _ in 0..untouched {
            if let Some(message) = self.messages.pop_front() {
                let _ = self.messages.push_back(message);
            }
        }

        report
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.messages.is_full()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Queued messages, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &OutboundMessage> {
        self.messages.iter()
    }
}
