//! System control abstractions
//!
//! Watchdog servicing, process restart and the platform's own view of why
//! the chip last reset.

/// Platform-level system control
pub trait SystemControl {
    /// Re-arm the hardware watchdog
    ///
    /// Must be called at least once per watchdog period or the chip resets
    /// without any application-level record.
    fn feed_watchdog(&mut self);

    /// Restart the chip immediately
    ///
    /// Irreversible; no code runs after this call.
    fn restart(&mut self) -> !;

    /// Human readable platform reset reason for the current boot
    ///
    /// This is the hardware's answer (power-on, watchdog, ...), independent
    /// of the cause the application records before a controlled restart.
    fn reset_reason(&self) -> &'static str;
}
