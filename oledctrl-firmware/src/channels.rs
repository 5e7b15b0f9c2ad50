//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use portable_atomic::AtomicU32;

use oledctrl_core::Key;
use oledctrl_protocol::FRAME_LEN;

use crate::config::Screen;

/// Channel capacity for host-bound event reports
const EVENT_CHANNEL_SIZE: usize = 4;

/// Channel capacity for key events from the keymap
const KEY_CHANNEL_SIZE: usize = 16;

/// Dispatcher shared by the HID, link and render tasks
pub type SharedScreen = Mutex<CriticalSectionRawMutex, Screen>;

/// A key press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
}

/// Event reports waiting for the USB task
pub static HID_EVENTS: Channel<CriticalSectionRawMutex, [u8; FRAME_LEN], EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Key events from the keymap, for tag selection
pub static KEY_EVENTS: Channel<CriticalSectionRawMutex, KeyEvent, KEY_CHANNEL_SIZE> =
    Channel::new();

/// Signal that the relay mailbox holds a frame for the slave
pub static RELAY_PENDING: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Signal that the screen content changed and should be redrawn
pub static SCREEN_CHANGED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Active layer bitmask, written by the keymap
pub static LAYER_STATE: AtomicU32 = AtomicU32::new(0);
