//! Host-side mock peripherals for tests
//!
//! Every mock hands out a cloneable handle sharing its state, so a test can
//! keep driving an input (or inspecting an output) after the pin itself has
//! been moved into the component under test.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crate::gpio::{InputPin, OutputPin};
use crate::storage::{KeyValueStorage, StorageError, StorageKey};
use crate::system::SystemControl;

/// Mock digital input
#[derive(Debug, Clone, Default)]
pub struct MockInputPin {
    level: Rc<Cell<bool>>,
}

impl MockInputPin {
    /// Create a new mock input reading the given level
    pub fn new(high: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(high)),
        }
    }

    /// Set the level subsequent reads will return
    pub fn set_high(&self, high: bool) {
        self.level.set(high);
    }
}

impl InputPin for MockInputPin {
    fn is_high(&self) -> bool {
        self.level.get()
    }
}

/// Mock digital output
///
/// Tracks the driven level and the number of physical writes.
#[derive(Debug, Clone, Default)]
pub struct MockOutputPin {
    level: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

impl MockOutputPin {
    /// Create a new mock output, initially low
    pub fn new() -> Self {
        Self::default()
    }

    /// Level currently driven on the pin
    pub fn level(&self) -> bool {
        self.level.get()
    }

    /// Number of writes performed so far
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    /// Force the pin level from outside, as external tampering would
    pub fn force(&self, high: bool) {
        self.level.set(high);
    }
}

impl OutputPin for MockOutputPin {
    fn set_high(&mut self) {
        self.level.set(true);
        self.writes.set(self.writes.get() + 1);
    }

    fn set_low(&mut self) {
        self.level.set(false);
        self.writes.set(self.writes.get() + 1);
    }

    fn is_set_high(&self) -> bool {
        self.level.get()
    }
}

/// Mock blocking delay
///
/// Does not sleep; accumulates the requested time instead.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    total_ns: Rc<Cell<u64>>,
    calls: Rc<Cell<u32>>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requested delay in milliseconds
    pub fn total_ms(&self) -> u64 {
        self.total_ns.get() / 1_000_000
    }

    /// Number of delay calls made
    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + ns as u64);
        self.calls.set(self.calls.get() + 1);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns.set(self.total_ns.get() + ms as u64 * 1_000_000);
        self.calls.set(self.calls.get() + 1);
    }
}

/// In-memory key/value storage
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    entries: Rc<RefCell<BTreeMap<StorageKey, Vec<u8>>>>,
    writes: Rc<Cell<u32>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MockStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    /// Make every subsequent write fail with [`StorageError::Flash`]
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Raw bytes stored under a key
    pub fn raw(&self, key: StorageKey) -> Option<Vec<u8>> {
        self.entries.borrow().get(&key).cloned()
    }
}

impl KeyValueStorage for MockStorage {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let entries = self.entries.borrow();
        let data = entries.get(&key).ok_or(StorageError::NotFound)?;
        if buffer.len() < data.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Flash);
        }
        self.entries.borrow_mut().insert(key, data.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn erase_all(&mut self) -> Result<(), StorageError> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

/// Mock system control
///
/// `restart` panics with a message starting with `"restart requested"` so
/// tests can observe it with `#[should_panic]` or `catch_unwind`.
#[derive(Debug, Clone)]
pub struct MockSystem {
    feeds: Rc<Cell<u32>>,
    restarts: Rc<Cell<u32>>,
    reason: &'static str,
}

impl Default for MockSystem {
    fn default() -> Self {
        Self::new("POWERON_RESET")
    }
}

impl MockSystem {
    /// Create a mock reporting the given platform reset reason
    pub fn new(reason: &'static str) -> Self {
        Self {
            feeds: Rc::new(Cell::new(0)),
            restarts: Rc::new(Cell::new(0)),
            reason,
        }
    }

    /// Number of watchdog feeds so far
    pub fn feeds(&self) -> u32 {
        self.feeds.get()
    }

    /// Number of restart requests so far
    pub fn restarts(&self) -> u32 {
        self.restarts.get()
    }
}

impl SystemControl for MockSystem {
    fn feed_watchdog(&mut self) {
        self.feeds.set(self.feeds.get() + 1);
    }

    fn restart(&mut self) -> ! {
        self.restarts.set(self.restarts.get() + 1);
        panic!("restart requested");
    }

    fn reset_reason(&self) -> &'static str {
        self.reason
    }
}
