//! Pin allocation by number
//!
//! Pin assignments come from `device.toml`, so the firmware asks for pins by
//! GPIO number at runtime instead of naming `PIN_n` fields in code.

use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::{DMA_CH0, FLASH, PIN_0, PIN_1, UART0, WATCHDOG};
use embassy_rp::{Peri, Peripherals};

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already handed out
    AlreadyTaken,
    /// Pin bound to a fixed peripheral function
    Reserved,
}

/// GPIOs reserved for the bridge UART
pub const BRIDGE_TX_PIN: u8 = 0;
pub const BRIDGE_RX_PIN: u8 = 1;

/// Peripherals the controller uses outside the pin bank
///
/// The bridge UART needs its typed pins, so GPIO0/GPIO1 stay here.
pub struct BoardPeripherals {
    pub flash: Peri<'static, FLASH>,
    pub flash_dma: Peri<'static, DMA_CH0>,
    pub uart0: Peri<'static, UART0>,
    pub uart0_tx: Peri<'static, PIN_0>,
    pub uart0_rx: Peri<'static, PIN_1>,
    pub watchdog: Peri<'static, WATCHDOG>,
}

/// Every GPIO, each handed out at most once
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Split the chip peripherals into the pin bank and the rest
    pub fn split(p: Peripherals) -> (Self, BoardPeripherals) {
        let pins = [
            None,
            None,
            Some(p.PIN_2.into()),
            Some(p.PIN_3.into()),
            Some(p.PIN_4.into()),
            Some(p.PIN_5.into()),
            Some(p.PIN_6.into()),
            Some(p.PIN_7.into()),
            Some(p.PIN_8.into()),
            Some(p.PIN_9.into()),
            Some(p.PIN_10.into()),
            Some(p.PIN_11.into()),
            Some(p.PIN_12.into()),
            Some(p.PIN_13.into()),
            Some(p.PIN_14.into()),
            Some(p.PIN_15.into()),
            Some(p.PIN_16.into()),
            Some(p.PIN_17.into()),
            Some(p.PIN_18.into()),
            Some(p.PIN_19.into()),
            Some(p.PIN_20.into()),
            Some(p.PIN_21.into()),
            Some(p.PIN_22.into()),
            Some(p.PIN_23.into()),
            Some(p.PIN_24.into()),
            Some(p.PIN_25.into()),
            Some(p.PIN_26.into()),
            Some(p.PIN_27.into()),
            Some(p.PIN_28.into()),
            Some(p.PIN_29.into()),
        ];
        let rest = BoardPeripherals {
            flash: p.FLASH,
            flash_dma: p.DMA_CH0,
            uart0: p.UART0,
            uart0_tx: p.PIN_0,
            uart0_rx: p.PIN_1,
            watchdog: p.WATCHDOG,
        };
        (Self { pins }, rest)
    }

    /// Take a pin by GPIO number
    pub fn take(&mut self, pin: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if pin == BRIDGE_TX_PIN || pin == BRIDGE_RX_PIN {
            return Err(PinError::Reserved);
        }
        self.pins
            .get_mut(pin as usize)
            .ok_or(PinError::InvalidPin)?
            .take()
            .ok_or(PinError::AlreadyTaken)
    }

    /// Whether a pin is still available
    pub fn is_available(&self, pin: u8) -> bool {
        matches!(self.pins.get(pin as usize), Some(Some(_)))
    }
}
