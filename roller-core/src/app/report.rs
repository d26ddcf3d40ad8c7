//! Boot report
//!
//! Published once per boot, after the first successful connection. The
//! messages are queued all at once or not at all; a full queue defers the
//! report to a later tick.

use core::fmt::Write;

use heapless::String;

use super::App;
use crate::traits::Board;

/// Number of messages in the boot report
const REPORT_LEN: usize = 5;

impl<B: Board> App<B> {
    /// Queue the boot report; `false` if there was no room
    pub(super) fn enqueue_boot_report(&mut self) -> bool {
        if self.queue.capacity() - self.queue.len() < REPORT_LEN {
            return false;
        }

        let boot = self.boot;
        let topics = &self.topics;
        let mut number: String<20> = String::new();

        let mut ok = self
            .queue
            .enqueue(&topics.restart_reason_platform, boot.reset_reason.as_bytes(), true, None)
            .is_ok();

        let _ = write!(number, "{}", boot.previous.uptime_ms);
        ok &= self
            .queue
            .enqueue(&topics.restart_reason_uptime, number.as_bytes(), true, None)
            .is_ok();

        number.clear();
        let _ = write!(number, "{}", boot.previous.cause.code());
        ok &= self
            .queue
            .enqueue(&topics.restart_reason_code, number.as_bytes(), true, None)
            .is_ok();

        ok &= self
            .queue
            .enqueue(
                &topics.restart_reason_sw,
                boot.previous.cause.describe().as_bytes(),
                true,
                None,
            )
            .is_ok();

        number.clear();
        let _ = write!(number, "{}", boot.run_counter.saturating_sub(1));
        ok &= self
            .queue
            .enqueue(&topics.restart_reason_run_id, number.as_bytes(), true, None)
            .is_ok();

        if !ok {
            log_warn!("Boot report incomplete");
        } else {
            log_info!("Boot report queued");
        }
        // Room was checked up front; a refused message here is malformed and
        // would be refused again.
        true
    }
}
