//! Framing for the serial link between the two keyboard halves.
//!
//! The raw HID frame relayed from master to slave travels over a byte stream,
//! so it is wrapped in a small checksummed frame:
//!
//! - START (1 byte): 0xA5 synchronization byte
//! - LENGTH (1 byte): payload length (0-32)
//! - TYPE (1 byte): link message type
//! - PAYLOAD (0-32 bytes)
//! - CHECKSUM (1 byte): XOR of LENGTH, TYPE, and all PAYLOAD bytes

use heapless::Vec;

use crate::frame::FRAME_LEN;

/// Frame synchronization byte
pub const LINK_START: u8 = 0xA5;

/// Maximum payload size in bytes
pub const MAX_LINK_PAYLOAD: usize = FRAME_LEN;

/// Maximum encoded link frame (START + LENGTH + TYPE + PAYLOAD + CHECKSUM)
pub const MAX_LINK_FRAME: usize = 1 + 1 + 1 + MAX_LINK_PAYLOAD + 1;

/// Link message carrying a relayed OLED command
pub const LINK_RELAY: u8 = 0x01;

/// Errors that can occur on the split link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Invalid frame structure
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// One message on the split link
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkFrame {
    pub msg_type: u8,
    pub payload: Vec<u8, MAX_LINK_PAYLOAD>,
}

impl LinkFrame {
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, LinkError> {
        let mut vec = Vec::new();
        vec.extend_from_slice(payload)
            .map_err(|_| LinkError::PayloadTooLarge)?;
        Ok(Self {
            msg_type,
            payload: vec,
        })
    }

    /// Wrap a relayed HID frame
    pub fn relay(frame: &[u8]) -> Result<Self, LinkError> {
        Self::new(LINK_RELAY, frame)
    }

    fn checksum(length: u8, msg_type: u8, payload: &[u8]) -> u8 {
        payload.iter().fold(length ^ msg_type, |acc, &b| acc ^ b)
    }

    /// Encode into `buffer`, returning the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, LinkError> {
        let n = self.payload.len();
        let frame_len = n + 4;
        if buffer.len() < frame_len {
            return Err(LinkError::BufferTooSmall);
        }

        let length = n as u8;
        buffer[0] = LINK_START;
        buffer[1] = length;
        buffer[2] = self.msg_type;
        buffer[3..3 + n].copy_from_slice(&self.payload);
        buffer[3 + n] = Self::checksum(length, self.msg_type, &self.payload);

        Ok(frame_len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    Length,
    Type,
    Payload,
    Checksum,
}

/// Byte-at-a-time parser that resynchronizes on the start byte
#[derive(Debug, Clone)]
pub struct LinkParser {
    state: ParseState,
    expected: u8,
    msg_type: u8,
    payload: Vec<u8, MAX_LINK_PAYLOAD>,
}

impl Default for LinkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkParser {
    pub const fn new() -> Self {
        Self {
            state: ParseState::Start,
            expected: 0,
            msg_type: 0,
            payload: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.state = ParseState::Start;
        self.expected = 0;
        self.msg_type = 0;
        self.payload.clear();
    }

    /// Feed one byte; yields a frame once its checksum byte arrives
    pub fn feed(&mut self, byte: u8) -> Result<Option<LinkFrame>, LinkError> {
        match self.state {
            ParseState::Start => {
                if byte == LINK_START {
                    self.state = ParseState::Length;
                }
                Ok(None)
            }
            ParseState::Length => {
                if byte as usize > MAX_LINK_PAYLOAD {
                    self.reset();
                    return Err(LinkError::InvalidFrame);
                }
                self.expected = byte;
                self.state = ParseState::Type;
                Ok(None)
            }
            ParseState::Type => {
                self.msg_type = byte;
                self.payload.clear();
                self.state = if self.expected == 0 {
                    ParseState::Checksum
                } else {
                    ParseState::Payload
                };
                Ok(None)
            }
            ParseState::Payload => {
                // Length was bounded above, so this cannot overflow
                let _ = self.payload.push(byte);
                if self.payload.len() == self.expected as usize {
                    self.state = ParseState::Checksum;
                }
                Ok(None)
            }
            ParseState::Checksum => {
                let expected = LinkFrame::checksum(self.expected, self.msg_type, &self.payload);
                if byte != expected {
                    self.reset();
                    return Err(LinkError::InvalidChecksum);
                }
                let frame = LinkFrame {
                    msg_type: self.msg_type,
                    payload: self.payload.clone(),
                };
                self.reset();
                Ok(Some(frame))
            }
        }
    }
}
