//! State repository trait
//!
//! All persistence the control loop performs goes through this trait, so
//! the motion, queue and restart logic never touch raw storage keys.

use roller_hal::StorageError;

use crate::input::SwitchState;
use crate::motion::MotionState;
use crate::restart::RestartRecord;

/// Binary state that is persisted across restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchSlot {
    /// Debounced push button
    Button,
    /// Auxiliary (audio) relay
    Audio,
}

/// Errors from the state repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RepositoryError {
    /// Underlying storage failed
    Storage(StorageError),
    /// Stored bytes could not be encoded or decoded
    Encoding,
}

impl From<StorageError> for RepositoryError {
    fn from(e: StorageError) -> Self {
        RepositoryError::Storage(e)
    }
}

/// Persistent controller state
///
/// `load_*` return `Ok(None)` for a value that was never written.
pub trait StateRepository {
    /// Last persisted motion state
    fn load_motion(&mut self) -> Result<Option<MotionState>, RepositoryError>;

    /// Persist the motion state
    fn save_motion(&mut self, state: MotionState) -> Result<(), RepositoryError>;

    /// Last persisted state of a switch
    fn load_switch(&mut self, slot: SwitchSlot) -> Result<Option<SwitchState>, RepositoryError>;

    /// Persist the state of a switch
    fn save_switch(&mut self, slot: SwitchSlot, state: SwitchState)
        -> Result<(), RepositoryError>;

    /// Restart record left by the previous run
    fn load_restart(&mut self) -> Result<Option<RestartRecord>, RepositoryError>;

    /// Persist a restart record
    fn save_restart(&mut self, record: &RestartRecord) -> Result<(), RepositoryError>;

    /// Increment the boot counter and return the value for this run
    ///
    /// The first run after a fresh flash is run 1.
    fn bump_run_counter(&mut self) -> Result<u32, RepositoryError>;
}
