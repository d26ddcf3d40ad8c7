//! Key/value storage abstractions
//!
//! Provides a trait for persistent key-value storage that can be implemented
//! by chip-specific HALs using their flash memory.

/// Storage keys for state that survives a restart
///
/// These keys identify the different values stored in flash. The actual
/// storage implementation handles wear leveling and data integrity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Last blinds motion state
    MotionState = 0,
    /// Last debounced push button state
    ButtonState = 1,
    /// Last commanded auxiliary (audio) relay state
    AudioState = 2,
    /// Cause code of the last controlled restart
    RestartCause = 3,
    /// Uptime (ms) recorded right before the last controlled restart
    RestartUptime = 4,
    /// Boot counter, incremented once per boot
    RunCounter = 5,
}

impl StorageKey {
    /// All keys, in wire order
    pub const ALL: [StorageKey; 6] = [
        StorageKey::MotionState,
        StorageKey::ButtonState,
        StorageKey::AudioState,
        StorageKey::RestartCause,
        StorageKey::RestartUptime,
        StorageKey::RunCounter,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_u8() == value)
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Key/value storage trait
///
/// Values are opaque byte strings; encoding is the caller's concern.
/// Calls are blocking: the control loop only touches storage on state
/// changes, at boot and right before a controlled restart.
pub trait KeyValueStorage {
    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or [`StorageError::NotFound`] if the key was
    /// never written.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value by key, replacing any previous value
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool {
        let mut probe = [0u8; 16];
        matches!(
            self.read(key, &mut probe),
            Ok(_) | Err(StorageError::BufferTooSmall)
        )
    }

    /// Erase all stored data
    fn erase_all(&mut self) -> Result<(), StorageError>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
