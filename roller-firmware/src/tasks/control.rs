//! Control loop task
//!
//! Runs [`App::tick`] once per period and feeds it the update events the
//! bridge reports.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use roller_core::app::App;
use roller_protocol::UpdateEvent;

use crate::board::PicoBoard;
use crate::channels::UPDATE_EVENTS;

#[embassy_executor::task]
pub async fn control_task(app: &'static mut App<PicoBoard>, tick_ms: u64) {
    info!("Control task started, tick {} ms", tick_ms);

    let mut ticker = Ticker::every(Duration::from_millis(tick_ms));
    loop {
        ticker.next().await;
        let now = Instant::now().as_millis();

        while let Ok(event) = UPDATE_EVENTS.try_receive() {
            match event {
                UpdateEvent::Started => app.begin_update(now),
                UpdateEvent::Progress(percent) => app.update_progress(percent),
                UpdateEvent::Finished(ok) => app.finish_update(ok, now),
            }
        }

        app.tick(now);
    }
}
