//! Keymap for one keyboard half
//!
//! ```text
//! Default                           Lower
//! ,-----------------------------.   ,-----------------------------.
//! | Esc|  1 |  2 |  3 |  4 |  5 |   | SM | M+ | M- | SS | S+ | S- |
//! |    |    |    |    |    |    |   |    |    |    |    |    |    |
//! |    |    |    |    |    |    |   |    |    |    |    |    |    |
//! |    |    |    |    |    |    |   |    |    |    |    |    |    |
//! `----|    |    |LOWR|    |RAIS'   `----|    |    |LOWR|    |RAIS'
//! ```
//!
//! SM/SS select a tag on the master/slave screen, M+/M-/S+/S- step it.
//! Raise puts the digits on the home rows. Lower and Raise together give
//! Adjust, which is left empty.

use oledctrl_core::{Action, Key, TagKey, TriLayer};
use oledctrl_protocol::ScreenId;

pub const ROWS: usize = 5;
pub const COLS: usize = 6;

pub const LOWER: u8 = 1;
pub const RAISE: u8 = 2;
pub const ADJUST: u8 = 3;

pub const TRI_LAYER: TriLayer = TriLayer {
    lower: LOWER,
    raise: RAISE,
    adjust: ADJUST,
};

const NO: Action = Action::None;
const TR: Action = Action::Transparent;
const KC: Action = Action::Key(Key::Other);
const LO: Action = Action::Momentary(LOWER);
const RA: Action = Action::Momentary(RAISE);

const fn digit(d: u8) -> Action {
    Action::Key(Key::Digit(d))
}

const fn tag(key: TagKey) -> Action {
    Action::Key(Key::Tag(key))
}

const SM: Action = tag(TagKey::Select(ScreenId::Master));
const MI: Action = tag(TagKey::Increment(ScreenId::Master));
const MD: Action = tag(TagKey::Decrement(ScreenId::Master));
const SS: Action = tag(TagKey::Select(ScreenId::Slave));
const SI: Action = tag(TagKey::Increment(ScreenId::Slave));
const SD: Action = tag(TagKey::Decrement(ScreenId::Slave));

pub static LAYERS: [[[Action; COLS]; ROWS]; 4] = [
    // Default
    [
        [KC, digit(1), digit(2), digit(3), digit(4), digit(5)],
        [KC, KC, KC, KC, KC, KC],
        [KC, KC, KC, KC, KC, KC],
        [KC, KC, KC, KC, KC, KC],
        [NO, KC, KC, LO, KC, RA],
    ],
    // Lower
    [
        [SM, MI, MD, SS, SI, SD],
        [TR, TR, TR, TR, TR, TR],
        [TR, TR, TR, TR, TR, TR],
        [TR, TR, TR, TR, TR, TR],
        [TR, TR, TR, TR, TR, TR],
    ],
    // Raise
    [
        [TR, TR, TR, TR, TR, TR],
        [KC, digit(1), digit(2), digit(3), digit(4), digit(5)],
        [digit(6), digit(7), digit(8), digit(9), digit(0), KC],
        [TR, TR, TR, TR, TR, TR],
        [TR, TR, TR, TR, TR, TR],
    ],
    // Adjust
    [
        [NO, NO, NO, NO, NO, NO],
        [NO, NO, NO, NO, NO, NO],
        [NO, NO, NO, NO, NO, NO],
        [NO, NO, NO, NO, NO, NO],
        [TR, TR, TR, TR, TR, TR],
    ],
];
