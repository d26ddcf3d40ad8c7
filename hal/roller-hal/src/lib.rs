//! Roller Hardware Abstraction Layer
//!
//! This crate defines the peripheral-level traits the blinds controller
//! needs from a board. Chip-specific HALs (currently RP2040) implement them,
//! and the board-agnostic logic in `roller-core` only ever sees these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (roller-firmware)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  roller-core / roller-drivers           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  roller-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  roller-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`storage::KeyValueStorage`] - Persistent key/value storage
//! - [`system::SystemControl`] - Watchdog, restart and reset reason
//!
//! With the `mock` feature the [`mock`] module provides host-side fakes of
//! all of the above for tests.

#![cfg_attr(not(feature = "mock"), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod storage;
pub mod system;

#[cfg(feature = "mock")]
pub mod mock;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use storage::{KeyValueStorage, StorageError, StorageKey};
pub use system::SystemControl;
