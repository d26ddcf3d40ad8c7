//! State repository over key/value storage
//!
//! Each value lives under its own [`StorageKey`] and is encoded with
//! postcard. The restart record is split over two keys (cause code and
//! uptime) so either can be inspected on its own.

use roller_core::input::SwitchState;
use roller_core::motion::MotionState;
use roller_core::restart::{RestartCause, RestartRecord};
use roller_core::traits::{RepositoryError, StateRepository, SwitchSlot};
use roller_hal::{KeyValueStorage, StorageError, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Largest encoded value (a varint u64 takes 10 bytes)
const VALUE_BUF_LEN: usize = 16;

/// [`StateRepository`] backed by a [`KeyValueStorage`]
pub struct KvStateRepository<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> KvStateRepository<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Give the storage back
    pub fn into_inner(self) -> S {
        self.storage
    }

    fn load<T: DeserializeOwned>(
        &mut self,
        key: StorageKey,
    ) -> Result<Option<T>, RepositoryError> {
        let mut buf = [0u8; VALUE_BUF_LEN];
        let len = match self.storage.read(key, &mut buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        postcard::from_bytes(&buf[..len])
            .map(Some)
            .map_err(|_| RepositoryError::Encoding)
    }

    fn store<T: Serialize>(&mut self, key: StorageKey, value: &T) -> Result<(), RepositoryError> {
        let mut buf = [0u8; VALUE_BUF_LEN];
        let used = postcard::to_slice(value, &mut buf).map_err(|_| RepositoryError::Encoding)?;
        self.storage.write(key, used)?;
        Ok(())
    }
}

fn switch_key(slot: SwitchSlot) -> StorageKey {
    match slot {
        SwitchSlot::Button => StorageKey::ButtonState,
        SwitchSlot::Audio => StorageKey::AudioState,
    }
}

impl<S: KeyValueStorage> StateRepository for KvStateRepository<S> {
    fn load_motion(&mut self) -> Result<Option<MotionState>, RepositoryError> {
        self.load(StorageKey::MotionState)
    }

    fn save_motion(&mut self, state: MotionState) -> Result<(), RepositoryError> {
        self.store(StorageKey::MotionState, &state)
    }

    fn load_switch(&mut self, slot: SwitchSlot) -> Result<Option<SwitchState>, RepositoryError> {
        self.load(switch_key(slot))
    }

    fn save_switch(
        &mut self,
        slot: SwitchSlot,
        state: SwitchState,
    ) -> Result<(), RepositoryError> {
        self.store(switch_key(slot), &state)
    }

    fn load_restart(&mut self) -> Result<Option<RestartRecord>, RepositoryError> {
        let Some(code) = self.load::<u8>(StorageKey::RestartCause)? else {
            return Ok(None);
        };
        let uptime_ms = self.load::<u64>(StorageKey::RestartUptime)?.unwrap_or(0);
        Ok(Some(RestartRecord {
            cause: RestartCause::from_code(code),
            uptime_ms,
        }))
    }

    fn save_restart(&mut self, record: &RestartRecord) -> Result<(), RepositoryError> {
        self.store(StorageKey::RestartUptime, &record.uptime_ms)?;
        self.store(StorageKey::RestartCause, &record.cause.code())
    }

    fn bump_run_counter(&mut self) -> Result<u32, RepositoryError> {
        let run = self
            .load::<u32>(StorageKey::RunCounter)?
            .unwrap_or(0)
            .wrapping_add(1);
        self.store(StorageKey::RunCounter, &run)?;
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roller_hal::mock::MockStorage;

    #[test]
    fn test_empty_storage_loads_none() {
        let mut repo = KvStateRepository::new(MockStorage::new());
        assert_eq!(repo.load_motion(), Ok(None));
        assert_eq!(repo.load_switch(SwitchSlot::Audio), Ok(None));
        assert_eq!(repo.load_restart(), Ok(None));
    }

    #[test]
    fn test_motion_and_switches() {
        let mut repo = KvStateRepository::new(MockStorage::new());
        repo.save_motion(MotionState::Obstructed).unwrap();
        repo.save_switch(SwitchSlot::Audio, SwitchState::On).unwrap();

        assert_eq!(repo.load_motion(), Ok(Some(MotionState::Obstructed)));
        assert_eq!(repo.load_switch(SwitchSlot::Audio), Ok(Some(SwitchState::On)));
        assert_eq!(repo.load_switch(SwitchSlot::Button), Ok(None));
    }

    #[test]
    fn test_restart_record_round_trip() {
        let mut repo = KvStateRepository::new(MockStorage::new());
        let record = RestartRecord {
            cause: RestartCause::from_code(5),
            uptime_ms: 12_345,
        };
        repo.save_restart(&record).unwrap();
        assert_eq!(repo.load_restart(), Ok(Some(record)));
    }

    #[test]
    fn test_unknown_cause_code_kept() {
        let storage = MockStorage::new();
        let mut repo = KvStateRepository::new(storage.clone());
        repo.save_restart(&RestartRecord {
            cause: RestartCause::Other(99),
            uptime_ms: 1,
        })
        .unwrap();
        assert_eq!(
            storage.raw(StorageKey::RestartCause).as_deref(),
            Some(&[99u8][..])
        );
        assert_eq!(
            repo.load_restart().unwrap().map(|r| r.cause),
            Some(RestartCause::Other(99))
        );
    }

    #[test]
    fn test_run_counter_increments() {
        let mut repo = KvStateRepository::new(MockStorage::new());
        assert_eq!(repo.bump_run_counter(), Ok(1));
        assert_eq!(repo.bump_run_counter(), Ok(2));
        assert_eq!(repo.bump_run_counter(), Ok(3));
    }

    #[test]
    fn test_corrupt_value() {
        let mut storage = MockStorage::new();
        storage.write(StorageKey::MotionState, &[0xFF]).unwrap();
        let mut repo = KvStateRepository::new(storage);
        assert_eq!(repo.load_motion(), Err(RepositoryError::Encoding));
    }

    #[test]
    fn test_write_failure_propagates() {
        let storage = MockStorage::new();
        storage.set_fail_writes(true);
        let mut repo = KvStateRepository::new(storage);
        assert_eq!(
            repo.save_motion(MotionState::FullUp),
            Err(RepositoryError::Storage(StorageError::Flash))
        );
    }
}
