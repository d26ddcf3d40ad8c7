//! Bridge UART receive task
//!
//! Parses frames from the bridge and dispatches them to the channels.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use roller_core::traits::InboundMessage;
use roller_protocol::{BridgeMessage, FrameParser};

use crate::channels::{INBOUND, LINK_SESSION, LINK_UP, UPDATE_EVENTS};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn bridge_rx_task(mut rx: BufferedUartRx) {
    info!("Bridge RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                parser.reset();
                continue;
            }
        };
        trace!("RX: {} bytes", n);

        parser.feed_bytes(&buf[..n], |result| match result {
            Ok(frame) => match BridgeMessage::from_frame(&frame) {
                Ok(message) => dispatch(message),
                Err(e) => warn!("Bad bridge message: {:?}", e),
            },
            Err(e) => warn!("Frame error: {:?}", e),
        });
    }
}

fn dispatch(message: BridgeMessage) {
    match message {
        BridgeMessage::LinkStatus { connected } => {
            let was = LINK_UP.load(Ordering::Acquire);
            if connected && !was {
                LINK_SESSION.fetch_add(1, Ordering::AcqRel);
            }
            LINK_UP.store(connected, Ordering::Release);
            if was != connected {
                info!("Bridge link {}", if connected { "up" } else { "down" });
            }
        }
        BridgeMessage::Inbound { topic, payload } => {
            let Some(message) = InboundMessage::new(&topic, &payload) else {
                warn!("Inbound message too large for {}", topic.as_str());
                return;
            };
            if INBOUND.try_send(message).is_err() {
                warn!("Inbound channel full, dropping message");
            }
        }
        BridgeMessage::Update(event) => {
            debug!("Update event: {:?}", event);
            if UPDATE_EVENTS.try_send(event).is_err() {
                warn!("Update channel full, dropping event");
            }
        }
    }
}
