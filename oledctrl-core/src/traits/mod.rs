//! Collaborator traits
//!
//! These traits define the interface between the protocol engine and the
//! board: the character display it draws on and the HID endpoint events
//! leave through.

pub mod display;
pub mod hid;

pub use display::{CharDisplay, DisplayError};
pub use hid::HidSink;
