//! Message vocabulary of the OLED control protocol
//!
//! - Host → Keyboard: commands addressed to one of the two screens
//! - Keyboard → Host: responses to those commands, and unsolicited events

use crate::frame::{FrameBuf, FrameError, BYPASS_0, BYPASS_1, HEADER_LEN, MAX_PAYLOAD_LEN};

// Result ids (byte 0 of keyboard → host messages)
const RESULT_SUCCESS: u8 = 0x00;
const RESULT_FAILURE: u8 = 0x01;

// Message kinds (byte 1 of keyboard → host messages)
const KIND_RESPONSE: u8 = 0x00;
const KIND_EVENT: u8 = 0x01;

// Command ids (byte 2)
pub const CMD_SET_UP: u8 = 0x00;
pub const CMD_CLEAR: u8 = 0x01;
pub const CMD_SET_LINE: u8 = 0x02;
pub const CMD_PRESENT: u8 = 0x03;

// Screen ids (byte 3)
const SCREEN_MASTER: u8 = 0x00;
const SCREEN_SLAVE: u8 = 0x01;

/// Outcome of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResultCode {
    Success,
    Failure,
}

impl ResultCode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            RESULT_SUCCESS => Some(ResultCode::Success),
            RESULT_FAILURE => Some(ResultCode::Failure),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            ResultCode::Success => RESULT_SUCCESS,
            ResultCode::Failure => RESULT_FAILURE,
        }
    }

    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }
}

impl<T, E> From<&Result<T, E>> for ResultCode {
    fn from(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            ResultCode::Success
        } else {
            ResultCode::Failure
        }
    }
}

/// Whether a keyboard → host message answers a command or reports an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    Response,
    Event,
}

impl MessageKind {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            KIND_RESPONSE => Some(MessageKind::Response),
            KIND_EVENT => Some(MessageKind::Event),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            MessageKind::Response => KIND_RESPONSE,
            MessageKind::Event => KIND_EVENT,
        }
    }
}

/// Screen commands sent by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Clear, and report the screen size as `[cols, rows]`
    SetUp,
    /// Clear both buffers; the screen reverts to its default content
    Clear,
    /// Replace one line of the back buffer: `[line, text...]`
    SetLine,
    /// Copy the back buffer to the front buffer
    Present,
}

impl Command {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_SET_UP => Some(Command::SetUp),
            CMD_CLEAR => Some(Command::Clear),
            CMD_SET_LINE => Some(Command::SetLine),
            CMD_PRESENT => Some(Command::Present),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Command::SetUp => CMD_SET_UP,
            Command::Clear => CMD_CLEAR,
            Command::SetLine => CMD_SET_LINE,
            Command::Present => CMD_PRESENT,
        }
    }
}

/// Which half's display a message is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenId {
    /// Display on the half connected to USB
    Master,
    /// Display on the other half, reached through the split link
    Slave,
}

impl ScreenId {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SCREEN_MASTER => Some(ScreenId::Master),
            SCREEN_SLAVE => Some(ScreenId::Slave),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            ScreenId::Master => SCREEN_MASTER,
            ScreenId::Slave => SCREEN_SLAVE,
        }
    }
}

/// Commands as built by a host.
///
/// The firmware never builds these; they exist for host tooling and for
/// driving the dispatcher in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostRequest<'a> {
    SetUp(ScreenId),
    Clear(ScreenId),
    SetLine {
        screen: ScreenId,
        line: u8,
        text: &'a [u8],
    },
    Present(ScreenId),
}

impl<'a> HostRequest<'a> {
    pub fn command(&self) -> Command {
        match self {
            HostRequest::SetUp(_) => Command::SetUp,
            HostRequest::Clear(_) => Command::Clear,
            HostRequest::SetLine { .. } => Command::SetLine,
            HostRequest::Present(_) => Command::Present,
        }
    }

    pub fn screen(&self) -> ScreenId {
        match self {
            HostRequest::SetUp(screen)
            | HostRequest::Clear(screen)
            | HostRequest::Present(screen)
            | HostRequest::SetLine { screen, .. } => *screen,
        }
    }

    /// Encode with the VIA bypass header.
    ///
    /// Text that does not fit the report is cut off.
    pub fn to_frame(&self) -> FrameBuf {
        let header = [
            BYPASS_0,
            BYPASS_1,
            self.command().to_byte(),
            self.screen().to_byte(),
        ];
        match self {
            HostRequest::SetLine { line, text, .. } => {
                let mut payload = [0u8; MAX_PAYLOAD_LEN];
                payload[0] = *line;
                let n = text.len().min(MAX_PAYLOAD_LEN - 1);
                payload[1..1 + n].copy_from_slice(&text[..n]);
                FrameBuf::with_header(header, &payload[..1 + n])
            }
            _ => FrameBuf::with_header(header, &[]),
        }
    }
}

/// A response decoded on the host side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response<'a> {
    pub result: ResultCode,
    pub command: u8,
    pub screen: u8,
    pub payload: &'a [u8],
}

impl<'a> Response<'a> {
    /// Parse a keyboard → host message that is a response.
    ///
    /// Returns `None` for events and malformed frames.
    pub fn parse(bytes: &'a [u8]) -> Result<Option<Self>, FrameError> {
        if bytes.len() < HEADER_LEN {
            return Err(FrameError::TooShort);
        }
        if MessageKind::from_byte(bytes[1]) != Some(MessageKind::Response) {
            return Ok(None);
        }
        let Some(result) = ResultCode::from_byte(bytes[0]) else {
            return Ok(None);
        };
        Ok(Some(Self {
            result,
            command: bytes[2],
            screen: bytes[3],
            payload: &bytes[HEADER_LEN..],
        }))
    }

    /// Screen size reported by a successful set-up response, as `(cols, rows)`
    pub fn dimensions(&self) -> Option<(u8, u8)> {
        if self.command != CMD_SET_UP || !self.result.is_success() || self.payload.len() < 2 {
            return None;
        }
        Some((self.payload[0], self.payload[1]))
    }
}
