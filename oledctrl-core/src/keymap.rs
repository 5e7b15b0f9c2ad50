//! Layered keymap
//!
//! Resolves matrix positions to [`Key`]s through a stack of layers and
//! tracks the layer state that `%l` shows. Momentary layer keys turn their
//! layer on while held. With a tri-layer configured, holding both lower
//! layers turns the third one on.

use crate::keys::Key;

/// Number of layers a `u32` layer state can hold
pub const MAX_LAYERS: usize = 32;

/// What a keymap position does on one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Does nothing
    None,
    /// Falls through to the next active layer below
    Transparent,
    Key(Key),
    /// Turns a layer on while held
    Momentary(u8),
}

/// Errors building a keymap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeymapError {
    /// No layers at all
    NoLayers,
    /// More layers than fit the layer state
    TooManyLayers(usize),
    /// A momentary or tri-layer key names a layer that does not exist
    UnknownLayer(u8),
}

/// Three layers where holding the first two turns on the third
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriLayer {
    pub lower: u8,
    pub raise: u8,
    pub adjust: u8,
}

/// Layer stack for a `ROWS` x `COLS` matrix
pub struct Keymap<'a, const ROWS: usize, const COLS: usize> {
    layers: &'a [[[Action; COLS]; ROWS]],
    tri_layer: Option<TriLayer>,
    /// Layers turned on by held momentary keys
    momentary: u32,
    state: u32,
    /// Layer each held position was resolved on
    held: [[Option<u8>; COLS]; ROWS],
}

impl<'a, const ROWS: usize, const COLS: usize> Keymap<'a, ROWS, COLS> {
    pub fn new(
        layers: &'a [[[Action; COLS]; ROWS]],
        tri_layer: Option<TriLayer>,
    ) -> Result<Self, KeymapError> {
        if layers.is_empty() {
            return Err(KeymapError::NoLayers);
        }
        if layers.len() > MAX_LAYERS {
            return Err(KeymapError::TooManyLayers(layers.len()));
        }
        let exists = |layer: u8| (layer as usize) < layers.len();
        if let Some(t) = tri_layer {
            for layer in [t.lower, t.raise, t.adjust] {
                if !exists(layer) {
                    return Err(KeymapError::UnknownLayer(layer));
                }
            }
        }
        for action in layers.iter().flatten().flatten() {
            if let Action::Momentary(layer) = *action {
                if !exists(layer) {
                    return Err(KeymapError::UnknownLayer(layer));
                }
            }
        }

        Ok(Self {
            layers,
            tri_layer,
            momentary: 0,
            state: 0,
            held: [[None; COLS]; ROWS],
        })
    }

    /// Active layer bitmask; 0 means only the base layer
    pub fn layer_state(&self) -> u32 {
        self.state
    }

    /// Handle a press or release at a matrix position.
    ///
    /// Returns the key for the key handler, or `None` when the position
    /// only changes layers or does nothing. A release always resolves on
    /// the layer its press did, even if layers changed in between.
    pub fn process(&mut self, row: usize, col: usize, pressed: bool) -> Option<Key> {
        if row >= ROWS || col >= COLS {
            return None;
        }

        let layer = if pressed {
            let layer = self.resolve(row, col);
            self.held[row][col] = Some(layer);
            layer
        } else {
            self.held[row][col].take()?
        };

        match self.layers[layer as usize][row][col] {
            Action::Key(key) => Some(key),
            Action::Momentary(target) => {
                if pressed {
                    self.momentary |= 1 << target;
                } else {
                    self.momentary &= !(1 << target);
                }
                self.update_state();
                None
            }
            Action::None | Action::Transparent => None,
        }
    }

    /// Highest active layer with something other than `Transparent` here
    fn resolve(&self, row: usize, col: usize) -> u8 {
        (1..self.layers.len())
            .rev()
            .filter(|&layer| self.state & (1 << layer) != 0)
            .find(|&layer| self.layers[layer][row][col] != Action::Transparent)
            .unwrap_or(0) as u8
    }

    fn update_state(&mut self) {
        let mut state = self.momentary;
        if let Some(t) = self.tri_layer {
            let both = (1 << t.lower) | (1 << t.raise);
            if state & both == both {
                state |= 1 << t.adjust;
            } else {
                state &= !(1 << t.adjust);
            }
        }
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::TagKey;
    use oledctrl_protocol::ScreenId;

    const LOWER: u8 = 1;
    const RAISE: u8 = 2;
    const ADJUST: u8 = 3;

    const SEL_KEY: Key = Key::Tag(TagKey::Select(ScreenId::Master));
    const T: Action = Action::Transparent;
    const SEL: Action = Action::Key(SEL_KEY);

    // 1 row x 4 cols: [digit, lower, raise, other]
    const LAYERS: [[[Action; 4]; 1]; 4] = [
        [[
            Action::Key(Key::Digit(1)),
            Action::Momentary(LOWER),
            Action::Momentary(RAISE),
            Action::Key(Key::Other),
        ]],
        [[SEL, T, T, Action::None]],
        [[T, T, T, Action::Key(Key::Digit(9))]],
        [[Action::Key(Key::Digit(0)), T, T, T]],
    ];

    const TRI: TriLayer = TriLayer {
        lower: LOWER,
        raise: RAISE,
        adjust: ADJUST,
    };

    fn keymap() -> Keymap<'static, 1, 4> {
        Keymap::new(&LAYERS, Some(TRI)).unwrap()
    }

    #[test]
    fn test_base_layer() {
        let mut map = keymap();
        assert_eq!(map.process(0, 0, true), Some(Key::Digit(1)));
        assert_eq!(map.process(0, 0, false), Some(Key::Digit(1)));
        assert_eq!(map.layer_state(), 0);
    }

    #[test]
    fn test_momentary_layer() {
        let mut map = keymap();
        assert_eq!(map.process(0, 1, true), None);
        assert_eq!(map.layer_state(), 1 << LOWER);
        assert_eq!(map.process(0, 0, true), Some(SEL_KEY));
        assert_eq!(map.process(0, 3, true), None);

        assert_eq!(map.process(0, 1, false), None);
        assert_eq!(map.layer_state(), 0);
    }

    #[test]
    fn test_transparent_falls_through() {
        let mut map = keymap();
        map.process(0, 2, true);
        assert_eq!(map.layer_state(), 1 << RAISE);
        assert_eq!(map.process(0, 0, true), Some(Key::Digit(1)));
        assert_eq!(map.process(0, 3, true), Some(Key::Digit(9)));
    }

    #[test]
    fn test_tri_layer() {
        let mut map = keymap();
        map.process(0, 1, true);
        map.process(0, 2, true);
        assert_eq!(map.layer_state(), (1 << LOWER) | (1 << RAISE) | (1 << ADJUST));
        assert_eq!(map.process(0, 0, true), Some(Key::Digit(0)));

        map.process(0, 2, false);
        assert_eq!(map.layer_state(), 1 << LOWER);
    }

    #[test]
    fn test_release_uses_press_layer() {
        let mut map = keymap();
        map.process(0, 1, true);
        assert_eq!(map.process(0, 0, true), Some(SEL_KEY));
        map.process(0, 1, false);
        // Layer is gone, but the release still matches the press
        assert_eq!(map.process(0, 0, false), Some(SEL_KEY));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut map = keymap();
        assert_eq!(map.process(0, 0, false), None);
        assert_eq!(map.process(3, 0, true), None);
        assert_eq!(map.process(0, 9, true), None);
    }

    #[test]
    fn test_rejects_unknown_layers() {
        const BAD: [[[Action; 1]; 1]; 1] = [[[Action::Momentary(4)]]];
        assert_eq!(
            Keymap::new(&BAD, None).err(),
            Some(KeymapError::UnknownLayer(4))
        );

        let empty: [[[Action; 1]; 1]; 0] = [];
        assert_eq!(Keymap::new(&empty, None).err(), Some(KeymapError::NoLayers));

        let tri = TriLayer {
            lower: 1,
            raise: 2,
            adjust: 7,
        };
        assert_eq!(
            Keymap::new(&LAYERS, Some(tri)).err(),
            Some(KeymapError::UnknownLayer(7))
        );
    }
}
