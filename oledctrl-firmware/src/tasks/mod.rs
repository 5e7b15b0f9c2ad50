//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod keys;
pub mod link;
pub mod matrix;
pub mod render;
pub mod usb;

pub use keys::keys_task;
pub use link::{link_rx_task, link_tx_task};
pub use matrix::matrix_task;
pub use render::{render_task, Oled};
pub use usb::{raw_hid_task, usb_task, RawHid, UsbDriver};
