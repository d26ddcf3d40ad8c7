//! Watchdog, restart and reset reason for RP2040

use embassy_rp::peripherals::WATCHDOG;
use embassy_rp::watchdog::{ResetReason, Watchdog};
use embassy_rp::Peri;
use embassy_time::{block_for, Duration};
use embedded_hal::delay::DelayNs;

use roller_hal::system::SystemControl;

/// Longest period the RP2040 watchdog supports
pub const MAX_WATCHDOG_MS: u32 = 8_300;

/// [`SystemControl`] on the RP2040 watchdog
pub struct RpSystem {
    watchdog: Watchdog,
    reason: &'static str,
    restart_grace_ms: u32,
}

impl RpSystem {
    /// Start the watchdog with the given period
    ///
    /// The platform reset reason is latched before the watchdog is touched.
    /// `restart_grace_ms` is waited before a requested restart so pending
    /// link traffic can drain.
    pub fn new(peri: Peri<'static, WATCHDOG>, timeout_ms: u32, restart_grace_ms: u32) -> Self {
        let mut watchdog = Watchdog::new(peri);
        let reason = match watchdog.reset_reason() {
            None => "POWERON_RESET",
            Some(ResetReason::Forced) => "SOFTWARE_RESET",
            Some(ResetReason::TimedOut) => "WATCHDOG_RESET",
        };
        watchdog.start(Duration::from_millis(timeout_ms.min(MAX_WATCHDOG_MS) as u64));
        Self {
            watchdog,
            reason,
            restart_grace_ms,
        }
    }
}

impl SystemControl for RpSystem {
    fn feed_watchdog(&mut self) {
        self.watchdog.feed();
    }

    fn restart(&mut self) -> ! {
        block_for(Duration::from_millis(self.restart_grace_ms as u64));
        self.watchdog.trigger_reset();
        loop {
            cortex_m::asm::nop();
        }
    }

    fn reset_reason(&self) -> &'static str {
        self.reason
    }
}

/// Busy-wait delay on the embassy time driver
///
/// Used for the short blocking pauses inside the control loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingDelay;

impl DelayNs for BlockingDelay {
    fn delay_ns(&mut self, ns: u32) {
        block_for(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(ms as u64));
    }
}
