//! Tag selection keys
//!
//! A tag is picked in two steps: a select key chooses the screen, then the
//! next digit chooses the tag. The digit is swallowed. Any other key
//! cancels the selection and types normally.

use oledctrl_protocol::{ScreenId, TagEvent};

/// Keymap keys that drive tag events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TagKey {
    /// Arm selection for a screen
    Select(ScreenId),
    Increment(ScreenId),
    Decrement(ScreenId),
}

/// A key event as seen by the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    Tag(TagKey),
    /// Number row key, 0-9
    Digit(u8),
    Other,
}

/// What the key handler should do with a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyOutcome {
    /// Send this event; the key does nothing else
    Emit(TagEvent),
    /// Swallow the key
    Consumed,
    /// Process the key normally
    PassThrough,
}

/// Two-step tag selection state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSelector {
    armed: Option<ScreenId>,
}

impl TagSelector {
    pub const fn new() -> Self {
        Self { armed: None }
    }

    /// Screen waiting for a digit, if any
    pub fn armed(&self) -> Option<ScreenId> {
        self.armed
    }

    pub fn process(&mut self, key: Key, pressed: bool) -> KeyOutcome {
        match key {
            Key::Tag(TagKey::Select(screen)) => {
                self.armed = Some(screen);
                KeyOutcome::Consumed
            }
            Key::Tag(TagKey::Increment(screen)) if pressed => {
                KeyOutcome::Emit(TagEvent::Increment { screen })
            }
            Key::Tag(TagKey::Decrement(screen)) if pressed => {
                KeyOutcome::Emit(TagEvent::Decrement { screen })
            }
            Key::Tag(_) => KeyOutcome::Consumed,
            Key::Digit(_) | Key::Other => self.resolve(key, pressed),
        }
    }

    fn resolve(&mut self, key: Key, pressed: bool) -> KeyOutcome {
        if !pressed {
            return KeyOutcome::PassThrough;
        }
        let Some(screen) = self.armed.take() else {
            return KeyOutcome::PassThrough;
        };
        match key {
            Key::Digit(tag) if tag <= 9 => KeyOutcome::Emit(TagEvent::SetTag { screen, tag }),
            _ => KeyOutcome::PassThrough,
        }
    }
}
