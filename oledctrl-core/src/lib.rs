//! Board-agnostic core of the OLED remote-control firmware
//!
//! This crate holds everything that does not depend on the board:
//!
//! - Front/back screen buffers and the present swap
//! - Draw-time `%` variable expansion
//! - Command dispatch for raw HID frames
//! - The master to slave relay slots
//! - Event emission and the tag selection keys
//! - A layered keymap that tracks the layer state
//! - Collaborator traits (character display, HID sink)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod emitter;
pub mod keymap;
pub mod keys;
pub mod layers;
pub mod matrix;
pub mod relay;
pub mod render;
pub mod screen;
pub mod traits;

pub use config::{ConfigError, Geometry, Role};
pub use dispatch::{DispatchError, Dispatcher, Outcome};
pub use emitter::{EmitError, EventEmitter};
pub use keymap::{Action, Keymap, KeymapError, TriLayer};
pub use keys::{Key, KeyOutcome, TagKey, TagSelector};
pub use layers::LayerTable;
pub use matrix::CharMatrix;
pub use relay::{deliver, Inbox, Mailbox};
pub use render::{LayerNames, Render};
pub use screen::{BufferError, ScreenBuffers};
