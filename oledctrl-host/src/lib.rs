//! Host-side controller for split keyboard OLEDs
//!
//! Talks to the keyboard over raw HID: learns the screen size, draws text
//! screens on either half and follows the tag events the keyboard sends.
//!
//! - [`transport`]: raw HID access through hidapi
//! - [`controller`]: command/response exchange and event queueing
//! - [`tags`]: per-screen tag state
//! - [`perf`]: the system statistics screen

pub mod controller;
pub mod error;
pub mod perf;
pub mod tags;
pub mod transport;

pub use controller::Controller;
pub use error::HostError;
pub use perf::{perf_lines, PerfSampler, PerfStats};
pub use tags::Tags;
pub use transport::{DeviceFilter, HidTransport, Transport};
