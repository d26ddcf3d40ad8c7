//! Bus connection supervisor
//!
//! Keeps the transport connected, replays subscriptions after every
//! (re)connect and routes inbound topics to commands. A reconnect is
//! recognised by a new transport session, not only by the connection flag. Being disconnected
//! for longer than the liveness ceiling is reported as fatal; the control
//! loop answers it with a controlled restart.

use heapless::{String, Vec};

use crate::config::topics::{Topic, STATUS_OFFLINE, STATUS_ONLINE};
use crate::config::types::{MAX_CLIENT_ID_LEN, MAX_VERSION_LEN};
use crate::traits::transport::MAX_TOPIC_LEN;
use crate::traits::{ConnectOptions, QoS, Transport};

/// Maximum number of subscriptions
pub const MAX_SUBSCRIPTIONS: usize = 8;

/// Supervisor timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SupervisorConfig {
    /// Minimum time between connection attempts
    pub reconnect_interval_ms: u64,
    /// Disconnected time after which [`SupervisorEvent::LivenessExpired`] fires
    pub liveness_timeout_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            reconnect_interval_ms: 5_000,
            liveness_timeout_ms: 60_000,
        }
    }
}

/// Command an inbound topic maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// Blinds direction command (`u`/`d`/`s`)
    BlindsSet,
    /// Audio relay command (boolean payload)
    AudioSet,
    /// Controlled restart
    Restart,
}

/// Registered subscription
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Subscription {
    pub topic: String<MAX_TOPIC_LEN>,
    pub qos: QoS,
    pub command: CommandKind,
}

/// Subscription registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubscriptionError {
    /// [`MAX_SUBSCRIPTIONS`] reached
    TooMany,
    /// Topic does not fit
    TopicTooLong,
}

/// Connection changes reported by [`ConnectionSupervisor::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SupervisorEvent {
    /// Session established; status, version and subscriptions were sent
    Connected,
    /// Session lost
    Disconnected,
    /// Disconnected for longer than the liveness ceiling
    LivenessExpired,
}

/// Bus connection supervisor
pub struct ConnectionSupervisor {
    config: SupervisorConfig,
    client_id: String<MAX_CLIENT_ID_LEN>,
    version: String<MAX_VERSION_LEN>,
    status_topic: Topic,
    version_topic: Topic,
    subscriptions: Vec<Subscription, MAX_SUBSCRIPTIONS>,
    connected: bool,
    /// Transport session the subscriptions were last sent on
    session: u32,
    last_attempt: Option<u64>,
    /// Start of the current disconnected period
    offline_since: u64,
}

impl ConnectionSupervisor {
    /// Create a supervisor
    ///
    /// The device counts as disconnected from `now_ms`.
    pub fn new(
        config: SupervisorConfig,
        client_id: &String<MAX_CLIENT_ID_LEN>,
        version: &String<MAX_VERSION_LEN>,
        status_topic: &Topic,
        version_topic: &Topic,
        now_ms: u64,
    ) -> Self {
        Self {
            config,
            client_id: client_id.clone(),
            version: version.clone(),
            status_topic: status_topic.clone(),
            version_topic: version_topic.clone(),
            subscriptions: Vec::new(),
            connected: false,
            session: 0,
            last_attempt: None,
            offline_since: now_ms,
        }
    }

    /// Register a subscription
    ///
    /// Subscriptions are sent to the transport on the next (re)connect, so
    /// they should all be registered before the first [`poll`](Self::poll).
    pub fn register(
        &mut self,
        topic: &str,
        qos: QoS,
        command: CommandKind,
    ) -> Result<(), SubscriptionError> {
        let mut t = String::new();
        t.push_str(topic)
            .map_err(|_| SubscriptionError::TopicTooLong)?;
        self.subscriptions
            .push(Subscription {
                topic: t,
                qos,
                command,
            })
            .map_err(|_| SubscriptionError::TooMany)
    }

    /// Maintain the connection
    pub fn poll<T: Transport>(&mut self, transport: &mut T, now_ms: u64) -> Option<SupervisorEvent> {
        if transport.is_connected() {
            if self.connected {
                if transport.session() == self.session {
                    return None;
                }
                log_info!("Bus session renewed");
            }
            self.on_connected(transport);
            return Some(SupervisorEvent::Connected);
        }

        if self.connected {
            log_info!("Bus connection lost");
            self.connected = false;
            self.offline_since = now_ms;
            return Some(SupervisorEvent::Disconnected);
        }

        let offline_for = now_ms.saturating_sub(self.offline_since);
        if offline_for >= self.config.liveness_timeout_ms {
            log_error!("No bus connection for {} ms", offline_for);
            return Some(SupervisorEvent::LivenessExpired);
        }

        let due = self.last_attempt.map_or(true, |at| {
            now_ms.saturating_sub(at) >= self.config.reconnect_interval_ms
        });
        if !due {
            return None;
        }

        self.last_attempt = Some(now_ms);
        log_debug!("Connecting as {}", self.client_id.as_str());
        let options = ConnectOptions {
            client_id: &self.client_id,
            will_topic: &self.status_topic,
            will_payload: STATUS_OFFLINE.as_bytes(),
        };
        if !transport.connect(&options) {
            return None;
        }

        self.on_connected(transport);
        Some(SupervisorEvent::Connected)
    }

    fn on_connected<T: Transport>(&mut self, transport: &mut T) {
        log_info!("Bus connected");
        self.connected = true;
        self.session = transport.session();

        if !transport.publish(&self.status_topic, STATUS_ONLINE.as_bytes(), true) {
            log_warn!("Status publish refused");
        }
        if !self.version.is_empty()
            && !transport.publish(&self.version_topic, self.version.as_bytes(), true)
        {
            log_warn!("Version publish refused");
        }
        for sub in &self.subscriptions {
            if !transport.subscribe(&sub.topic, sub.qos) {
                log_warn!("Subscribe to {} refused", sub.topic.as_str());
            }
        }
    }

    /// Command registered for an inbound topic
    pub fn route(&self, topic: &str) -> Option<CommandKind> {
        self.subscriptions
            .iter()
            .find(|s| s.topic.as_str() == topic)
            .map(|s| s.command)
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }
}
