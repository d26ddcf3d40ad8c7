//! Control loop
//!
//! [`App`] owns every component and the board peripherals and is driven by
//! one call to [`App::tick`] per loop period. Within a tick the order is
//! fixed: watchdog, button, blinds, inbound commands, queue drain, then
//! connection maintenance. Nothing in a tick blocks except the relay settle
//! pause of a direction change.

mod report;

use embedded_hal::delay::DelayNs;
use roller_hal::SystemControl;

use crate::config::{ConfigError, DeviceConfig, Topics};
use crate::delivery::{MessageQueue, DEFAULT_CAPACITY};
use crate::input::{ButtonState, DebouncedInput, SwitchState};
use crate::motion::{BlindsController, MotionState};
use crate::output::SwitchedOutput;
use crate::payload::{
    parse_blinds_command, parse_bool_payload, switch_payload, BlindsCommand,
};
use crate::restart::{self, BootInfo, RestartCause};
use crate::supervisor::{
    CommandKind, ConnectionSupervisor, SubscriptionError, SupervisorEvent,
};
use crate::traits::{
    Board, Direction, Peripherals, QoS, StateRepository, SwitchSlot, Transport,
};
use crate::update::UpdateMonitor;

/// Outbound queue capacity
pub const QUEUE_CAPACITY: usize = DEFAULT_CAPACITY;

/// Inbound messages handled per tick at most
pub const MAX_INBOUND_PER_TICK: usize = 8;

/// Errors while setting up the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppError {
    Config(ConfigError),
    Subscription(SubscriptionError),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<SubscriptionError> for AppError {
    fn from(e: SubscriptionError) -> Self {
        AppError::Subscription(e)
    }
}

/// Blinds controller application
pub struct App<B: Board> {
    config: DeviceConfig,
    topics: Topics,
    blinds: BlindsController<B::Actuator, B::EndSensor, B::Delay>,
    button: DebouncedInput<B::Button>,
    audio: SwitchedOutput<B::AudioRelay>,
    queue: MessageQueue<QUEUE_CAPACITY>,
    supervisor: ConnectionSupervisor,
    update: UpdateMonitor,
    transport: B::Transport,
    repository: B::Repository,
    system: B::System,
    delay: B::Delay,
    boot: BootInfo,
    boot_report_pending: bool,
}

impl<B: Board> App<B> {
    /// Build the application
    ///
    /// Bumps the run counter, reads and clears the previous restart record,
    /// restores the persisted motion and audio state and queues their
    /// current values for publication.
    pub fn new(
        peripherals: Peripherals<B>,
        config: DeviceConfig,
        now_ms: u64,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let topics = Topics::new(&config.topic_prefix)?;
        let timing = config.timing;
        let polarity = config.polarity;

        let Peripherals {
            actuator,
            end_sensor,
            button,
            audio_relay,
            delay,
            transport,
            mut repository,
            system,
        } = peripherals;

        let run_counter = repository.bump_run_counter().unwrap_or_else(|e| {
            log_warn!("Run counter unavailable: {:?}", e);
            0
        });
        let previous = restart::read_last_restart_info(&mut repository);
        let boot = BootInfo {
            previous,
            reset_reason: system.reset_reason(),
            run_counter,
        };
        log_info!(
            "Run {} started, reset reason {}",
            boot.run_counter,
            boot.reset_reason
        );

        let end_sensor = DebouncedInput::new(
            end_sensor,
            timing.end_sensor_debounce_ms,
            polarity.end_sensor_active_low,
        );
        let button =
            DebouncedInput::new(button, timing.button_debounce_ms, polarity.button_active_low);
        let mut blinds =
            BlindsController::new(actuator, end_sensor, delay.clone(), timing.motion());
        let mut audio = SwitchedOutput::new(audio_relay, polarity.audio_active_low);

        match repository.load_motion() {
            Ok(Some(state)) => blinds.restore(state),
            Ok(None) => {}
            Err(e) => log_warn!("Motion state unreadable: {:?}", e),
        }
        match repository.load_switch(SwitchSlot::Audio) {
            Ok(Some(state)) => {
                audio.set_state(state);
            }
            Ok(None) => {}
            Err(e) => log_warn!("Audio state unreadable: {:?}", e),
        }

        let mut supervisor = ConnectionSupervisor::new(
            timing.supervisor(),
            &config.client_id,
            &config.firmware_version,
            &topics.status,
            &topics.version,
            now_ms,
        );
        supervisor.register(&topics.blinds_set, QoS::AtMostOnce, CommandKind::BlindsSet)?;
        supervisor.register(&topics.audio_set, QoS::AtMostOnce, CommandKind::AudioSet)?;
        supervisor.register(&topics.restart, QoS::AtMostOnce, CommandKind::Restart)?;

        let mut app = Self {
            config,
            topics,
            blinds,
            button,
            audio,
            queue: MessageQueue::new(),
            supervisor,
            update: UpdateMonitor::new(timing.update_timeout_ms),
            transport,
            repository,
            system,
            delay,
            boot,
            boot_report_pending: true,
        };
        app.publish_motion(app.blinds.state());
        app.publish_audio(app.audio.state());
        Ok(app)
    }

    /// Run one iteration of the control loop
    pub fn tick(&mut self, now_ms: u64) {
        self.system.feed_watchdog();

        if self.update.is_active() {
            if self.update.expired(now_ms) {
                self.restart(RestartCause::UpdateTimeout, now_ms);
            }
            return;
        }

        if let Some(state) = self.button.poll(now_ms) {
            self.on_button(state, now_ms);
        }

        if let Some(state) = self.blinds.poll(now_ms) {
            self.on_motion(state);
        }

        for _ in 0..MAX_INBOUND_PER_TICK {
            let Some(message) = self.transport.poll_inbound() else {
                break;
            };
            match self.supervisor.route(&message.topic) {
                Some(command) => self.on_command(command, &message.payload, now_ms),
                None => log_debug!("No route for {}", message.topic.as_str()),
            }
        }

        if self.supervisor.is_connected() && self.transport.is_connected() {
            let transport = &mut self.transport;
            let limit = transport.send_capacity();
            let report = self.queue.drain_up_to(now_ms, limit, |m| {
                transport.publish(&m.topic, &m.payload, m.retained)
            });
            if report.dropped > 0 || report.expired > 0 {
                log_debug!("Drain: {:?}", report);
            }
        }

        match self.supervisor.poll(&mut self.transport, now_ms) {
            Some(SupervisorEvent::LivenessExpired) => {
                self.restart(RestartCause::ConnectivityWatchdog, now_ms)
            }
            Some(SupervisorEvent::Connected) | Some(SupervisorEvent::Disconnected) | None => {}
        }

        if self.boot_report_pending && self.supervisor.is_connected() {
            self.boot_report_pending = !self.enqueue_boot_report();
        }
    }

    fn on_button(&mut self, state: ButtonState, now_ms: u64) {
        log_info!("Button {:?}", state);
        if let Err(e) = self.repository.save_switch(SwitchSlot::Button, state) {
            log_warn!("Button state not saved: {:?}", e);
        }

        let ttl = self.config.timing.event_ttl_ms;
        let expires_at = (ttl > 0).then(|| now_ms.saturating_add(ttl));
        if let Err(e) = self.queue.enqueue(
            &self.topics.button_state,
            switch_payload(state),
            true,
            expires_at,
        ) {
            log_warn!("Button state not queued: {:?}", e);
        }

        if state == SwitchState::On {
            if let Some(motion) = self.blinds.cycle(now_ms) {
                self.on_motion(motion);
            }
        }
    }

    fn on_motion(&mut self, state: MotionState) {
        if let Err(e) = self.repository.save_motion(state) {
            log_warn!("Motion state not saved: {:?}", e);
        }
        self.publish_motion(state);
    }

    fn on_command(&mut self, command: CommandKind, payload: &[u8], now_ms: u64) {
        match command {
            CommandKind::BlindsSet => {
                let changed = match parse_blinds_command(payload) {
                    Some(BlindsCommand::Move(Direction::Up)) => self.blinds.push_up(now_ms),
                    Some(BlindsCommand::Move(Direction::Down)) => self.blinds.push_down(now_ms),
                    Some(BlindsCommand::Stop) => self.blinds.stop(),
                    None => {
                        log_warn!("Unknown blinds command");
                        None
                    }
                };
                if let Some(state) = changed {
                    self.on_motion(state);
                }
            }
            CommandKind::AudioSet => {
                let on = parse_bool_payload(payload, self.audio.is_on());
                if let Some(state) = self.audio.set_state(SwitchState::from_bool(on)) {
                    if let Err(e) = self.repository.save_switch(SwitchSlot::Audio, state) {
                        log_warn!("Audio state not saved: {:?}", e);
                    }
                    self.publish_audio(state);
                }
            }
            CommandKind::Restart => self.restart(RestartCause::RemoteReset, now_ms),
        }
    }

    fn publish_motion(&mut self, state: MotionState) {
        if let Err(e) = self.queue.enqueue(
            &self.topics.blinds_state,
            state.as_str().as_bytes(),
            true,
            None,
        ) {
            log_warn!("Blinds state not queued: {:?}", e);
        }
    }

    fn publish_audio(&mut self, state: SwitchState) {
        if let Err(e) = self
            .queue
            .enqueue(&self.topics.audio_state, switch_payload(state), true, None)
        {
            log_warn!("Audio state not queued: {:?}", e);
        }
    }

    fn restart(&mut self, cause: RestartCause, now_ms: u64) -> ! {
        self.blinds.stop();
        restart::record_and_restart(&mut self.repository, &mut self.system, cause, now_ms)
    }

    /// An external firmware update session started
    ///
    /// A rolling blind is stopped first: while the session is active the
    /// loop no longer watches the end sensor or the obstruction timeout.
    pub fn begin_update(&mut self, now_ms: u64) {
        if self.blinds.state().is_rolling() {
            if let Some(state) = self.blinds.stop() {
                self.on_motion(state);
            }
        }
        self.update.begin(now_ms);
    }

    /// Progress of the active update session in percent
    pub fn update_progress(&mut self, percent: u8) {
        self.update.progress(percent);
    }

    /// The update session ended; restarts in both cases
    ///
    /// A failure is held for the configured time first, so the bridge can
    /// report it before the link drops.
    pub fn finish_update(&mut self, success: bool, now_ms: u64) -> ! {
        if success {
            log_info!("Update finished");
            self.restart(RestartCause::UpdateSuccess, now_ms)
        }

        log_error!("Update failed");
        self.system.feed_watchdog();
        self.delay.delay_ms(self.config.timing.update_failure_hold_ms);
        self.system.feed_watchdog();
        let hold = u64::from(self.config.timing.update_failure_hold_ms);
        self.restart(RestartCause::UpdateFailure, now_ms.saturating_add(hold))
    }

    pub fn motion_state(&self) -> MotionState {
        self.blinds.state()
    }

    pub fn audio_state(&self) -> SwitchState {
        self.audio.state()
    }

    pub fn button_state(&self) -> ButtonState {
        self.button.state()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_connected(&self) -> bool {
        self.supervisor.is_connected()
    }

    pub fn is_updating(&self) -> bool {
        self.update.is_active()
    }

    pub fn boot_info(&self) -> &BootInfo {
        &self.boot
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn transport(&self) -> &B::Transport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut B::Transport {
        &mut self.transport
    }

    pub fn repository(&self) -> &B::Repository {
        &self.repository
    }

    pub fn actuator(&self) -> &B::Actuator {
        self.blinds.actuator()
    }
}
