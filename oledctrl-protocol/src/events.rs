//! Tag events pushed from the keyboard to the host

use crate::frame::{FrameBuf, FrameError, FRAME_LEN, HEADER_LEN};
use crate::messages::{MessageKind, ResultCode, ScreenId};

// Wire format values (byte 2 of an event frame)
const EVENT_SET_TAG: u8 = 0x00;
const EVENT_INCREMENT_TAG: u8 = 0x01;
const EVENT_DECREMENT_TAG: u8 = 0x02;

/// Event argument bytes that fit in a report.
///
/// Arguments start at byte 3, so the last report byte is always zero.
pub const MAX_EVENT_ARGS: usize = FRAME_LEN - HEADER_LEN;

/// Event ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventId {
    SetTag,
    IncrementTag,
    DecrementTag,
}

impl EventId {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            EVENT_SET_TAG => Some(EventId::SetTag),
            EVENT_INCREMENT_TAG => Some(EventId::IncrementTag),
            EVENT_DECREMENT_TAG => Some(EventId::DecrementTag),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            EventId::SetTag => EVENT_SET_TAG,
            EventId::IncrementTag => EVENT_INCREMENT_TAG,
            EventId::DecrementTag => EVENT_DECREMENT_TAG,
        }
    }
}

/// User request to show a different tag on one of the screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TagEvent {
    /// Show a specific tag (digit key 1-9 → 1-9, 0 → 0)
    SetTag { screen: ScreenId, tag: u8 },
    /// Go to the next tag
    Increment { screen: ScreenId },
    /// Go to the previous tag
    Decrement { screen: ScreenId },
}

impl TagEvent {
    pub fn id(&self) -> EventId {
        match self {
            TagEvent::SetTag { .. } => EventId::SetTag,
            TagEvent::Increment { .. } => EventId::IncrementTag,
            TagEvent::Decrement { .. } => EventId::DecrementTag,
        }
    }

    pub fn screen(&self) -> ScreenId {
        match self {
            TagEvent::SetTag { screen, .. }
            | TagEvent::Increment { screen }
            | TagEvent::Decrement { screen } => *screen,
        }
    }

    /// Argument bytes; returns the buffer and the number of bytes used
    fn args(&self) -> ([u8; 2], usize) {
        match self {
            TagEvent::SetTag { screen, tag } => ([screen.to_byte(), *tag], 2),
            TagEvent::Increment { screen } | TagEvent::Decrement { screen } => {
                ([screen.to_byte(), 0], 1)
            }
        }
    }

    /// Build the full-length event report
    pub fn to_frame(&self) -> FrameBuf {
        let (args, len) = self.args();
        event_frame(self.id(), &args[..len])
    }

    /// Decode an event report (host side)
    pub fn from_frame(bytes: &[u8]) -> Result<Option<Self>, FrameError> {
        if bytes.len() < HEADER_LEN {
            return Err(FrameError::TooShort);
        }
        if MessageKind::from_byte(bytes[1]) != Some(MessageKind::Event) {
            return Ok(None);
        }
        let Some(screen) = ScreenId::from_byte(bytes[3]) else {
            return Ok(None);
        };
        let event = match EventId::from_byte(bytes[2]) {
            Some(EventId::SetTag) => match bytes.get(4) {
                Some(&tag) => TagEvent::SetTag { screen, tag },
                None => return Ok(None),
            },
            Some(EventId::IncrementTag) => TagEvent::Increment { screen },
            Some(EventId::DecrementTag) => TagEvent::Decrement { screen },
            None => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// Build a 32-byte event report `[success, event, id, args...]`.
///
/// Arguments beyond [`MAX_EVENT_ARGS`] are dropped.
pub fn event_frame(id: EventId, args: &[u8]) -> FrameBuf {
    let n = args.len().min(MAX_EVENT_ARGS);
    let mut bytes = [0u8; FRAME_LEN];
    bytes[0] = ResultCode::Success.to_byte();
    bytes[1] = MessageKind::Event.to_byte();
    bytes[2] = id.to_byte();
    bytes[3..3 + n].copy_from_slice(&args[..n]);
    FrameBuf::from_report(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_frame_layout() {
        let frame = TagEvent::Increment {
            screen: ScreenId::Slave,
        }
        .to_frame();
        assert_eq!(frame.len(), FRAME_LEN);
        assert_eq!(&frame.as_bytes()[..4], &[0x00, 0x01, 0x01, 0x01]);
        assert!(frame.as_bytes()[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_tag_frame_layout() {
        let frame = TagEvent::SetTag {
            screen: ScreenId::Master,
            tag: 7,
        }
        .to_frame();
        assert_eq!(&frame.as_bytes()[..5], &[0x00, 0x01, 0x00, 0x00, 7]);
    }

    #[test]
    fn test_event_args_truncated() {
        let args = [0xEEu8; 40];
        let frame = event_frame(EventId::DecrementTag, &args);
        assert_eq!(frame.len(), FRAME_LEN);
        assert_eq!(frame.as_bytes()[2], 0x02);
        assert!(frame.as_bytes()[3..3 + MAX_EVENT_ARGS].iter().all(|&b| b == 0xEE));
        assert_eq!(frame.as_bytes()[FRAME_LEN - 1], 0);
    }

    #[test]
    fn test_event_decode() {
        let event = TagEvent::SetTag {
            screen: ScreenId::Slave,
            tag: 3,
        };
        let frame = event.to_frame();
        assert_eq!(TagEvent::from_frame(frame.as_bytes()), Ok(Some(event)));
    }

    #[test]
    fn test_response_is_not_an_event() {
        let bytes = [0x00, 0x00, 0x01, 0x00];
        assert_eq!(TagEvent::from_frame(&bytes), Ok(None));
    }

    #[test]
    fn test_unknown_event_id() {
        assert!(EventId::from_byte(0x03).is_none());
        assert!(EventId::from_byte(0xFF).is_none());
    }
}
