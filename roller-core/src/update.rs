//! Firmware update session tracking
//!
//! The update transfer itself is handled outside the controller. The
//! monitor only knows when a session started and whether it has run for
//! too long; the control loop stops normal work while a session is active.

/// Update session monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdateMonitor {
    timeout_ms: u64,
    started_at: Option<u64>,
    progress: u8,
}

impl UpdateMonitor {
    pub const fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            started_at: None,
            progress: 0,
        }
    }

    /// Start a session; a session already running keeps its start time
    pub fn begin(&mut self, now_ms: u64) {
        if self.started_at.is_none() {
            log_info!("Update started");
            self.started_at = Some(now_ms);
            self.progress = 0;
        }
    }

    /// Record transfer progress in percent (clamped to 100)
    pub fn progress(&mut self, percent: u8) {
        self.progress = percent.min(100);
        log_trace!("Update progress {}%", self.progress);
    }

    /// Last reported progress
    pub fn percent(&self) -> u8 {
        self.progress
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whether the active session has exceeded the timeout
    pub fn expired(&self, now_ms: u64) -> bool {
        self.started_at
            .is_some_and(|at| now_ms.saturating_sub(at) > self.timeout_ms)
    }
}
