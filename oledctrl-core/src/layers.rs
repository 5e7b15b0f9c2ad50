//! Layer name lookup for `%l`

use core::fmt;

use crate::render::LayerNames;

/// Names of the keymap layers, indexed by layer number.
///
/// The active layer is the highest bit set in the layer state, the way
/// layered keymaps resolve overlapping layers.
#[derive(Debug, Clone, Copy)]
pub struct LayerTable<'a> {
    names: &'a [&'a str],
    state: u32,
}

impl<'a> LayerTable<'a> {
    pub const fn new(names: &'a [&'a str]) -> Self {
        Self { names, state: 0 }
    }

    /// Replace the layer state bitmask
    pub fn set_state(&mut self, state: u32) {
        self.state = state;
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Highest active layer; layer 0 when no bit is set
    pub fn active(&self) -> u8 {
        match self.state {
            0 => 0,
            s => (31 - s.leading_zeros()) as u8,
        }
    }

    /// Configured name of the active layer
    pub fn active_name(&self) -> Option<&'a str> {
        self.names.get(self.active() as usize).copied()
    }
}

impl LayerNames for LayerTable<'_> {
    fn write_layer_name(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self.active_name() {
            Some(name) => out.write_str(name),
            None => write!(out, "Undef-{}", self.state),
        }
    }
}
