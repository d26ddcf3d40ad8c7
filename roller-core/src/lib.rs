//! Board-agnostic core logic for the Roller blinds controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (motor actuator, bus transport, state
//!   repository, board bundle)
//! - Debounced digital input and switched relay output
//! - Blinds motion state machine with end-of-travel and obstruction handling
//! - Bounded outbound message queue with retry and expiry
//! - Bus connection supervisor with connectivity watchdog
//! - Restart cause bookkeeping and firmware update monitoring
//! - Configuration type definitions
//! - The control loop that ties all of the above together

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
pub mod log;

pub mod app;
pub mod config;
pub mod delivery;
pub mod input;
pub mod motion;
pub mod output;
pub mod payload;
pub mod restart;
pub mod supervisor;
pub mod traits;
pub mod update;
