//! RP2040-specific HAL for the blinds controller
//!
//! Implements the `roller-hal` traits on embassy-rp:
//!
//! - [`gpio`] - relay outputs and switch inputs
//! - [`flash`] - wear-leveled key/value state store
//! - [`system`] - watchdog, controlled restart and reset reason
//! - [`pins`] - runtime pin allocation for config-driven wiring

#![no_std]

pub mod flash;
pub mod gpio;
pub mod pins;
pub mod system;

pub use flash::FlashStore;
pub use gpio::{RpInput, RpOutput};
pub use pins::{BoardPeripherals, PinBank, PinError, BRIDGE_RX_PIN, BRIDGE_TX_PIN};
pub use system::{BlockingDelay, RpSystem};
