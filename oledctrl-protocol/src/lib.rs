//! OLED Remote Control Protocol
//!
//! This crate defines the raw HID protocol a host uses to drive the two
//! character OLEDs of a split keyboard, and the framing used to relay those
//! commands across the serial link between the halves.
//!
//! # Protocol Overview
//!
//! Every message is one raw HID report of at most 32 bytes:
//! ```text
//! ┌──────┬──────┬─────────┬────────┬──────────────┐
//! │ 0x02 │ 0x00 │ COMMAND │ SCREEN │ PAYLOAD      │   host → keyboard
//! ├──────┼──────┼─────────┼────────┼──────────────┤
//! │ RES  │ 0x00 │ COMMAND │ SCREEN │ PAYLOAD      │   response
//! ├──────┼──────┼─────────┼────────┴──────────────┤
//! │ 0x00 │ 0x01 │ EVENT   │ ARGS                  │   event
//! └──────┴──────┴─────────┴───────────────────────┘
//! ```
//!
//! Commands are synchronous: the host sends one, the keyboard answers with
//! the same report rewritten in place.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod events;
pub mod frame;
pub mod link;
pub mod messages;

pub use events::{event_frame, EventId, TagEvent};
pub use frame::{FrameBuf, FrameError, Request, FRAME_LEN, HEADER_LEN, MAX_PAYLOAD_LEN};
pub use link::{LinkError, LinkFrame, LinkParser, LINK_RELAY, MAX_LINK_FRAME};
pub use messages::{Command, HostRequest, MessageKind, Response, ResultCode, ScreenId};
