//! Roller - window blinds controller firmware
//!
//! Drives a roller blind motor through relays, watches an end-of-travel
//! sensor and a push button, switches an auxiliary (audio) relay, and
//! reports to a publish/subscribe bus through a network bridge
//! co-processor on UART0.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Instant;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use roller_core::app::App;
use roller_core::config::ConfigFile;
use roller_core::traits::Peripherals;
use roller_drivers::storage::KvStateRepository;
use roller_hal_rp2040::{BlockingDelay, FlashStore, PinBank, RpSystem};

use crate::board::{BoardPins, BridgeTransport, PicoBoard};

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
/// The relay settle pause blocks the executor, so RX must hold a whole
/// pause of bridge traffic: 300 ms at 115200 baud is about 3.5 KB.
const RX_BUF_SIZE: usize = 4096;
static RX_BUF: StaticCell<[u8; RX_BUF_SIZE]> = StaticCell::new();

static APP: StaticCell<App<PicoBoard>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Roller firmware starting...");

    let p = embassy_rp::init(Default::default());
    let (mut bank, board) = PinBank::split(p);

    let ConfigFile { device, hardware } = config::load();
    let timing = device.timing;
    info!(
        "Client {} on {}, wiring {:?}",
        device.client_id.as_str(),
        device.topic_prefix.as_str(),
        hardware.wiring
    );

    // Latches the reset reason, then arms the watchdog
    let system = RpSystem::new(
        board.watchdog,
        timing.watchdog_timeout_ms,
        timing.restart_grace_ms,
    );

    let pins = unwrap!(BoardPins::take(&mut bank, &hardware));
    let repository = KvStateRepository::new(FlashStore::new(board.flash, board.flash_dma));

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = hardware.bridge_baud;
    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; RX_BUF_SIZE]);
    let uart = Uart::new_blocking(board.uart0, board.uart0_tx, board.uart0_rx, uart_config);
    let (tx, rx) = uart.into_buffered(Irqs, tx_buf, rx_buf).split();
    info!("Bridge UART at {} baud", hardware.bridge_baud);
    if hardware.bridge_bytes_in(timing.settle_ms) > RX_BUF_SIZE {
        warn!(
            "Settle pause of {} ms can overrun the {} B bridge RX buffer",
            timing.settle_ms, RX_BUF_SIZE
        );
    }

    let peripherals = Peripherals::<PicoBoard> {
        actuator: pins.actuator,
        end_sensor: pins.end_sensor,
        button: pins.button,
        audio_relay: pins.audio_relay,
        delay: BlockingDelay,
        transport: BridgeTransport,
        repository,
        system,
    };
    let app = unwrap!(App::new(peripherals, device, Instant::now().as_millis()));
    info!("Restored blinds state {:?}", app.motion_state());
    let app = APP.init(app);

    spawner.spawn(tasks::bridge_rx_task(rx)).unwrap();
    spawner.spawn(tasks::bridge_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::control_task(app, timing.tick_ms))
        .unwrap();

    info!("All tasks spawned, firmware running");
}
