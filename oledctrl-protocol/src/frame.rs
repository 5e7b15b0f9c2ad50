//! Raw HID frame buffer.
//!
//! Every message on the HID channel is a single report of at most 32 bytes:
//!
//! ```text
//! request:  [0x02][0x00][COMMAND][SCREEN][PAYLOAD ...]
//! response: [RESULT][KIND=0x00][COMMAND][SCREEN][PAYLOAD ...]
//! event:    [0x00][KIND=0x01][EVENT][ARGS ...]
//! ```
//!
//! The first two request bytes only exist so the host can bypass VIA. They
//! are never interpreted, and they are overwritten by the result code and
//! message kind when the same buffer is turned into the response.

use crate::messages::{MessageKind, ResultCode};

/// Size of a raw HID report
pub const FRAME_LEN: usize = 32;

/// Header size (two bypass/result bytes, command, screen)
pub const HEADER_LEN: usize = 4;

/// Largest payload that fits after the header
pub const MAX_PAYLOAD_LEN: usize = FRAME_LEN - HEADER_LEN;

/// Minimum length of a frame that gets a response at all
pub const MIN_RESPONSE_LEN: usize = 2;

/// First request byte sent by hosts to bypass VIA
pub const BYPASS_0: u8 = 0x02;

/// Second request byte sent by hosts to bypass VIA
pub const BYPASS_1: u8 = 0x00;

/// Errors that can occur when building or decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// No bytes at all
    Empty,
    /// More bytes than a HID report can hold
    TooLong,
    /// Not enough bytes for the command and screen header
    TooShort,
}

/// A request header and payload borrowed from a [`FrameBuf`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    /// Raw command id (byte 2)
    pub command: u8,
    /// Raw screen id (byte 3)
    pub screen: u8,
    /// Everything after the header, up to the frame length
    pub payload: &'a [u8],
}

/// An owned HID frame of 1 to 32 bytes.
///
/// The same buffer carries the request in and the response out, so decode,
/// dispatch and encode all operate on one value that is handed back to the
/// caller for transmission.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuf {
    bytes: [u8; FRAME_LEN],
    len: usize,
}

impl FrameBuf {
    /// Copy a received report into a frame.
    pub fn from_slice(data: &[u8]) -> Result<Self, FrameError> {
        if data.is_empty() {
            return Err(FrameError::Empty);
        }
        if data.len() > FRAME_LEN {
            return Err(FrameError::TooLong);
        }
        Ok(Self::copy_of(data))
    }

    /// Copy at most [`FRAME_LEN`] bytes of `data`, dropping the excess.
    pub fn clamped(data: &[u8]) -> Result<Self, FrameError> {
        if data.is_empty() {
            return Err(FrameError::Empty);
        }
        Ok(Self::copy_of(&data[..data.len().min(FRAME_LEN)]))
    }

    /// A full-length frame of zeros
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0; FRAME_LEN],
            len: FRAME_LEN,
        }
    }

    /// Take ownership of a full report
    pub const fn from_report(bytes: [u8; FRAME_LEN]) -> Self {
        Self {
            bytes,
            len: FRAME_LEN,
        }
    }

    fn copy_of(data: &[u8]) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..data.len()].copy_from_slice(data);
        Self {
            bytes,
            len: data.len(),
        }
    }

    /// Number of valid bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a frame holds at least one byte
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid bytes of the frame
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// The whole backing report, zero padded past `len()`
    pub fn as_report(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Decode the command header.
    ///
    /// Never reads past `len()`; a frame of exactly [`HEADER_LEN`] bytes
    /// decodes with an empty payload.
    pub fn request(&self) -> Result<Request<'_>, FrameError> {
        if self.len < HEADER_LEN {
            return Err(FrameError::TooShort);
        }
        Ok(Request {
            command: self.bytes[2],
            screen: self.bytes[3],
            payload: &self.bytes[HEADER_LEN..self.len],
        })
    }

    /// Rewrite the first two bytes as `[result, response]`.
    ///
    /// Frames shorter than [`MIN_RESPONSE_LEN`] cannot carry a response and
    /// are left alone.
    pub fn begin_response(&mut self, result: ResultCode) {
        if self.len >= MIN_RESPONSE_LEN {
            self.bytes[0] = result.to_byte();
            self.bytes[1] = MessageKind::Response.to_byte();
        }
    }

    /// Overwrite the result byte of a response
    pub fn set_result(&mut self, result: ResultCode) {
        if self.len >= MIN_RESPONSE_LEN {
            self.bytes[0] = result.to_byte();
        }
    }

    /// Result byte of a response, if the frame holds one
    pub fn result(&self) -> Option<ResultCode> {
        if self.len >= MIN_RESPONSE_LEN {
            ResultCode::from_byte(self.bytes[0])
        } else {
            None
        }
    }

    /// Write response payload bytes after the header.
    ///
    /// Output longer than [`MAX_PAYLOAD_LEN`] is truncated. The frame grows
    /// so the written bytes are part of what gets transmitted.
    pub fn write_payload(&mut self, data: &[u8]) {
        let n = data.len().min(MAX_PAYLOAD_LEN);
        self.bytes[HEADER_LEN..HEADER_LEN + n].copy_from_slice(&data[..n]);
        self.len = self.len.max(HEADER_LEN + n);
    }

    /// Build a frame from its four header bytes and a payload.
    ///
    /// The payload is truncated to [`MAX_PAYLOAD_LEN`].
    pub fn with_header(header: [u8; HEADER_LEN], payload: &[u8]) -> Self {
        let n = payload.len().min(MAX_PAYLOAD_LEN);
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..HEADER_LEN].copy_from_slice(&header);
        bytes[HEADER_LEN..HEADER_LEN + n].copy_from_slice(&payload[..n]);
        Self {
            bytes,
            len: HEADER_LEN + n,
        }
    }

    /// Pad the frame with zeros to a full report
    pub fn pad_to_report(&mut self) {
        self.len = FRAME_LEN;
    }
}

impl core::fmt::Debug for FrameBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FrameBuf").field(&self.as_bytes()).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FrameBuf {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FrameBuf({=[u8]:x})", self.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_slice_limits() {
        assert_eq!(FrameBuf::from_slice(&[]), Err(FrameError::Empty));
        assert_eq!(
            FrameBuf::from_slice(&[0u8; FRAME_LEN + 1]),
            Err(FrameError::TooLong)
        );
        assert_eq!(FrameBuf::from_slice(&[1]).unwrap().len(), 1);
    }

    #[test]
    fn test_clamped_drops_excess() {
        let data = [0xABu8; 40];
        let frame = FrameBuf::clamped(&data).unwrap();
        assert_eq!(frame.len(), FRAME_LEN);
        assert!(frame.as_bytes().iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_request_header_only() {
        let frame = FrameBuf::from_slice(&[0x02, 0x00, 0x01, 0x00]).unwrap();
        let req = frame.request().unwrap();
        assert_eq!(req.command, 0x01);
        assert_eq!(req.screen, 0x00);
        assert!(req.payload.is_empty());
    }

    #[test]
    fn test_request_payload_stops_at_len() {
        let frame = FrameBuf::from_slice(&[0x02, 0x00, 0x02, 0x00, 1, b'h', b'i']).unwrap();
        let req = frame.request().unwrap();
        assert_eq!(req.payload, &[1, b'h', b'i']);
    }

    #[test]
    fn test_request_too_short() {
        let frame = FrameBuf::from_slice(&[0x02, 0x00, 0x01]).unwrap();
        assert_eq!(frame.request(), Err(FrameError::TooShort));
    }

    #[test]
    fn test_begin_response_rewrites_bypass_bytes() {
        let mut frame = FrameBuf::from_slice(&[0x02, 0x00, 0x03, 0x01]).unwrap();
        frame.begin_response(ResultCode::Failure);
        assert_eq!(frame.as_bytes(), &[0x01, 0x00, 0x03, 0x01]);
        frame.set_result(ResultCode::Success);
        assert_eq!(frame.result(), Some(ResultCode::Success));
    }

    #[test]
    fn test_begin_response_ignores_single_byte() {
        let mut frame = FrameBuf::from_slice(&[0x02]).unwrap();
        frame.begin_response(ResultCode::Failure);
        assert_eq!(frame.as_bytes(), &[0x02]);
        assert_eq!(frame.result(), None);
    }

    #[test]
    fn test_write_payload_extends_short_frame() {
        let mut frame = FrameBuf::from_slice(&[0x02, 0x00, 0x00, 0x00]).unwrap();
        frame.write_payload(&[21, 4]);
        assert_eq!(frame.len(), 6);
        assert_eq!(&frame.as_bytes()[4..], &[21, 4]);
    }

    #[test]
    fn test_write_payload_keeps_full_report_length() {
        let mut frame = FrameBuf::zeroed();
        frame.write_payload(&[21, 4]);
        assert_eq!(frame.len(), FRAME_LEN);
    }

    proptest! {
        #[test]
        fn prop_request_never_exceeds_frame(data in proptest::collection::vec(any::<u8>(), 1..=FRAME_LEN)) {
            let frame = FrameBuf::from_slice(&data).unwrap();
            match frame.request() {
                Ok(req) => prop_assert_eq!(req.payload.len(), data.len() - HEADER_LEN),
                Err(e) => {
                    prop_assert_eq!(e, FrameError::TooShort);
                    prop_assert!(data.len() < HEADER_LEN);
                }
            }
        }
    }
}
