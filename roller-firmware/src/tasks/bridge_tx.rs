//! Bridge UART transmit task
//!
//! Writes queued controller frames to the bridge.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use roller_protocol::MAX_FRAME_SIZE;

use crate::channels::OUTBOUND;

#[embassy_executor::task]
pub async fn bridge_tx_task(mut tx: BufferedUartTx) {
    info!("Bridge TX task started");

    let mut buf = [0u8; MAX_FRAME_SIZE];
    loop {
        let frame = OUTBOUND.receive().await;
        let len = match frame.encode(&mut buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("Frame encode failed: {:?}", e);
                continue;
            }
        };
        if let Err(e) = tx.write_all(&buf[..len]).await {
            warn!("Bridge write failed: {:?}", e);
        }
    }
}
