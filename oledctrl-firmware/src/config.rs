//! Build-time keyboard configuration
//!
//! Constants generated from keyboard.toml by build.rs.

use oledctrl_core::{Dispatcher, Geometry};

include!(concat!(env!("OUT_DIR"), "/keyboard_config.rs"));

/// Character grid of the local OLED
pub const GEOMETRY: Geometry = Geometry::new(DISPLAY_COLS, DISPLAY_ROWS);

/// Dispatcher sized for the configured display
pub type Screen = Dispatcher<DISPLAY_CELLS>;
