//! Configuration loading
//!
//! `device.toml` is compiled into the image; build.rs has already checked
//! it with the full TOML parser. A file the on-target reader rejects falls
//! back to built-in defaults so the blind stays controllable.

use defmt::*;

use roller_core::config::{parse_config, ConfigFile};
use roller_hal_rp2040::{BRIDGE_RX_PIN, BRIDGE_TX_PIN};

/// Embedded device configuration
const EMBEDDED_CONFIG: &str = include_str!("../device.toml");

pub fn load() -> ConfigFile {
    let file = match parse_config(EMBEDDED_CONFIG) {
        Ok(file) => file,
        Err(e) => {
            error!("device.toml line {}: {:?}, using defaults", e.line, e.kind);
            return ConfigFile::default();
        }
    };

    if let Err(e) = file.hardware.validate() {
        error!("Pin assignment rejected: {:?}, using defaults", e);
        return ConfigFile::default();
    }
    if let Err(e) = file.device.validate() {
        error!("Device settings rejected: {:?}, using defaults", e);
        return ConfigFile::default();
    }
    let hw = &file.hardware;
    let gpio = [hw.relay_a, hw.relay_b, hw.audio_relay, hw.end_sensor, hw.button];
    if gpio
        .iter()
        .any(|p| p.pin == BRIDGE_TX_PIN || p.pin == BRIDGE_RX_PIN)
    {
        error!("GPIO{}/GPIO{} are reserved for the bridge UART, using defaults", BRIDGE_TX_PIN, BRIDGE_RX_PIN);
        return ConfigFile::default();
    }
    if file.hardware.bridge_tx.pin != BRIDGE_TX_PIN || file.hardware.bridge_rx.pin != BRIDGE_RX_PIN {
        warn!(
            "Bridge UART is fixed to GPIO{}/GPIO{}",
            BRIDGE_TX_PIN, BRIDGE_RX_PIN
        );
    }
    file
}
