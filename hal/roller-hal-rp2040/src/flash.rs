//! Flash key/value store for RP2040
//!
//! Wear-leveled map in the last 64KB of flash, on top of sequential-storage.
//! The control loop expects blocking storage, so each call drives the async
//! map operation to completion with `block_on`. Writes only happen on state
//! changes and before a controlled restart.

use embassy_futures::block_on;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use roller_hal::storage::{KeyValueStorage, StorageError, StorageKey};

/// Total flash on the board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
/// Size of the state partition at the top of flash
pub const STATE_PARTITION_SIZE: usize = 64 * 1024;
/// First byte of the state partition
pub const STATE_PARTITION_START: usize = FLASH_SIZE - STATE_PARTITION_SIZE;

/// Flash range handed to sequential-storage
pub const STATE_RANGE: core::ops::Range<u32> =
    (STATE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer for one map item; stored values are a few bytes
const ITEM_BUFFER_SIZE: usize = 64;

fn map_error<E>(err: sequential_storage::Error<E>) -> StorageError {
    match err {
        sequential_storage::Error::Storage { .. } => StorageError::Flash,
        sequential_storage::Error::FullStorage => StorageError::Full,
        sequential_storage::Error::Corrupted { .. } => StorageError::Corrupted,
        sequential_storage::Error::BufferTooSmall(_) => StorageError::BufferTooSmall,
        _ => StorageError::Storage,
    }
}

/// RP2040 flash-backed [`KeyValueStorage`]
pub struct FlashStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> FlashStore<'d> {
    /// Take the flash peripheral and a DMA channel for reads
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl KeyValueStorage for FlashStore<'_> {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let mut item = [0u8; ITEM_BUFFER_SIZE];
        let found = block_on(map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STATE_RANGE,
            &mut NoCache::new(),
            &mut item,
            &key,
        ))
        .map_err(map_error)?;

        let data = found.ok_or(StorageError::NotFound)?;
        let out = buffer
            .get_mut(..data.len())
            .ok_or(StorageError::BufferTooSmall)?;
        out.copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        let mut item = [0u8; ITEM_BUFFER_SIZE];
        block_on(map::store_item(
            &mut self.flash,
            STATE_RANGE,
            &mut NoCache::new(),
            &mut item,
            &key,
            &data,
        ))
        .map_err(map_error)
    }

    fn erase_all(&mut self) -> Result<(), StorageError> {
        self.flash
            .blocking_erase(STATE_RANGE.start, STATE_RANGE.end)
            .map_err(|_| StorageError::Flash)
    }
}
