//! Host controller errors

use oledctrl_protocol::{Command, FrameError, ScreenId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("No keyboard found with VID 0x{vid:04X} PID 0x{pid:04X}")]
    DeviceNotFound { vid: u16, pid: u16 },

    #[error("HID error: {0}")]
    Hid(String),

    #[error("HID permission denied: {0}")]
    PermissionDenied(String),

    #[error("No response to {command:?} on the {screen:?} screen")]
    Timeout { command: Command, screen: ScreenId },

    #[error("Keyboard rejected {command:?} on the {screen:?} screen")]
    Rejected { command: Command, screen: ScreenId },

    #[error("Set up reported an unusable screen size {cols}x{rows}")]
    BadGeometry { cols: u8, rows: u8 },

    #[error("Malformed report: {0:?}")]
    Malformed(FrameError),
}

impl From<hidapi::HidError> for HostError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            HostError::PermissionDenied(msg)
        } else {
            HostError::Hid(msg)
        }
    }
}

impl From<FrameError> for HostError {
    fn from(e: FrameError) -> Self {
        HostError::Malformed(e)
    }
}
