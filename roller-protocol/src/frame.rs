//! Byte framing for the bridge link
//!
//! - START (1 byte): `0xAA`
//! - LENGTH (1 byte): payload length, at most [`MAX_PAYLOAD_SIZE`]
//! - TYPE (1 byte): message type
//! - PAYLOAD (LENGTH bytes)
//! - CHECKSUM (1 byte): XOR of LENGTH, TYPE and every payload byte
//!
//! The UART gives no packet boundaries, so [`FrameParser`] consumes bytes one
//! at a time and resynchronises on the next START byte after any error.

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xAA;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Largest encoded frame (START + LENGTH + TYPE + payload + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + 4;

/// Errors produced while framing or decoding link traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// LENGTH byte out of range
    InvalidLength,
    /// Payload ended before a field was complete
    Truncated,
    /// A field held a value outside its domain
    InvalidField,
    /// TYPE byte not known to the receiver
    UnknownType(u8),
    /// Output buffer too small for encoding
    BufferTooSmall,
}

/// One message on the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Build a frame, copying the payload
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    /// Build a frame with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    fn checksum(length: u8, msg_type: u8, payload: &[u8]) -> u8 {
        payload.iter().fold(length ^ msg_type, |acc, b| acc ^ b)
    }

    /// Size of this frame once encoded
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + 4
    }

    /// Encode into `buffer`, returning the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let total = self.encoded_len();
        let out = buffer.get_mut(..total).ok_or(FrameError::BufferTooSmall)?;

        let length = self.payload.len() as u8;
        let body_end = 3 + self.payload.len();
        out[0] = FRAME_START;
        out[1] = length;
        out[2] = self.msg_type;
        out[3..body_end].copy_from_slice(&self.payload);
        out[body_end] = Self::checksum(length, self.msg_type, &self.payload);

        Ok(total)
    }

    /// Encode into a fixed-capacity vector
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut out = Vec::new();
        out.resize(self.encoded_len(), 0)
            .map_err(|_| FrameError::BufferTooSmall)?;
        self.encode(&mut out)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    Length,
    Type { length: u8 },
    Payload { length: u8, msg_type: u8 },
    Checksum { length: u8, msg_type: u8 },
}

/// Incremental frame decoder
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a parser waiting for a START byte
    pub fn new() -> Self {
        Self {
            state: ParseState::Start,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.state = ParseState::Start;
        self.payload.clear();
    }

    /// Whether the parser is in the middle of a frame
    pub fn in_frame(&self) -> bool {
        self.state != ParseState::Start
    }

    /// Feed one byte
    ///
    /// Returns `Ok(Some(frame))` once a frame completes, `Ok(None)` while more
    /// bytes are needed. On error the partial frame is discarded and the
    /// parser waits for the next START byte.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        self.state = match self.state {
            // Line noise between frames is ignored
            ParseState::Start if byte == FRAME_START => ParseState::Length,
            ParseState::Start => ParseState::Start,
            ParseState::Length => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::InvalidLength);
                }
                ParseState::Type { length: byte }
            }
            ParseState::Type { length } => {
                self.payload.clear();
                if length == 0 {
                    ParseState::Checksum {
                        length,
                        msg_type: byte,
                    }
                } else {
                    ParseState::Payload {
                        length,
                        msg_type: byte,
                    }
                }
            }
            ParseState::Payload { length, msg_type } => {
                // Bounded by the LENGTH check above
                let _ = self.payload.push(byte);
                if self.payload.len() == length as usize {
                    ParseState::Checksum { length, msg_type }
                } else {
                    ParseState::Payload { length, msg_type }
                }
            }
            ParseState::Checksum { length, msg_type } => {
                let valid = byte == Frame::checksum(length, msg_type, &self.payload);
                let payload = core::mem::take(&mut self.payload);
                self.reset();
                if !valid {
                    return Err(FrameError::InvalidChecksum);
                }
                return Ok(Some(Frame { msg_type, payload }));
            }
        };
        Ok(None)
    }

    /// Feed a chunk of bytes, handing every completed frame or framing error
    /// to `sink` in arrival order
    ///
    /// Unlike stopping at the first frame, nothing in the chunk is lost.
    pub fn feed_bytes<F>(&mut self, bytes: &[u8], mut sink: F)
    where
        F: FnMut(Result<Frame, FrameError>),
    {
        for &byte in bytes {
            match self.feed(byte) {
                Ok(Some(frame)) => sink(Ok(frame)),
                Ok(None) => {}
                Err(e) => sink(Err(e)),
            }
        }
    }
}
