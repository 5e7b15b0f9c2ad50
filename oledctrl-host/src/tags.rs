//! Per-screen tag selection driven by keyboard events

use oledctrl_protocol::{ScreenId, TagEvent};
use tracing::warn;

/// Current tag of each screen.
///
/// Tags run from 0 to `count - 1`; stepping past either end wraps around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tags {
    count: u8,
    current: [u8; 2],
}

fn index(screen: ScreenId) -> usize {
    match screen {
        ScreenId::Master => 0,
        ScreenId::Slave => 1,
    }
}

impl Tags {
    /// A count of zero is treated as one
    pub fn new(count: u8) -> Self {
        Self {
            count: count.max(1),
            current: [0; 2],
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn get(&self, screen: ScreenId) -> u8 {
        self.current[index(screen)]
    }

    /// Apply an event; returns the screen whose tag changed
    pub fn apply(&mut self, event: TagEvent) -> Option<ScreenId> {
        let screen = event.screen();
        let current = self.current[index(screen)];
        let next = match event {
            TagEvent::SetTag { tag, .. } if tag < self.count => tag,
            TagEvent::SetTag { tag, .. } => {
                warn!("Tag {} out of range on {:?}, ignored", tag, screen);
                return None;
            }
            TagEvent::Increment { .. } => self.step(current, 1),
            TagEvent::Decrement { .. } => self.step(current, u16::from(self.count) - 1),
        };

        if next == current {
            return None;
        }
        self.current[index(screen)] = next;
        Some(screen)
    }

    fn step(&self, current: u8, by: u16) -> u8 {
        ((u16::from(current) + by) % u16::from(self.count)) as u8
    }

    /// One-line summary such as `Tags: M1 S0`
    pub fn summary(&self) -> String {
        format!(
            "Tags: M{} S{}",
            self.get(ScreenId::Master),
            self.get(ScreenId::Slave)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_tag() {
        let mut tags = Tags::new(10);
        let event = TagEvent::SetTag {
            screen: ScreenId::Slave,
            tag: 7,
        };
        assert_eq!(tags.apply(event), Some(ScreenId::Slave));
        assert_eq!(tags.get(ScreenId::Slave), 7);
        assert_eq!(tags.get(ScreenId::Master), 0);
        // Same tag again is not a change
        assert_eq!(tags.apply(event), None);
    }

    #[test]
    fn test_set_tag_out_of_range() {
        let mut tags = Tags::new(4);
        let event = TagEvent::SetTag {
            screen: ScreenId::Master,
            tag: 4,
        };
        assert_eq!(tags.apply(event), None);
        assert_eq!(tags.get(ScreenId::Master), 0);
    }

    #[test]
    fn test_step_wraps() {
        let mut tags = Tags::new(3);
        let dec = TagEvent::Decrement {
            screen: ScreenId::Master,
        };
        let inc = TagEvent::Increment {
            screen: ScreenId::Master,
        };
        assert_eq!(tags.apply(dec), Some(ScreenId::Master));
        assert_eq!(tags.get(ScreenId::Master), 2);
        tags.apply(inc);
        assert_eq!(tags.get(ScreenId::Master), 0);
    }

    #[test]
    fn test_single_tag_never_changes() {
        let mut tags = Tags::new(0);
        assert_eq!(tags.count(), 1);
        let inc = TagEvent::Increment {
            screen: ScreenId::Slave,
        };
        assert_eq!(tags.apply(inc), None);
    }

    #[test]
    fn test_summary() {
        let mut tags = Tags::new(10);
        tags.apply(TagEvent::SetTag {
            screen: ScreenId::Master,
            tag: 1,
        });
        assert_eq!(tags.summary(), "Tags: M1 S0");
    }

    proptest! {
        #[test]
        fn prop_increment_then_decrement_is_identity(count in 1u8..=255, start in any::<u8>()) {
            let mut tags = Tags::new(count);
            let start = start % count;
            tags.apply(TagEvent::SetTag { screen: ScreenId::Master, tag: start });
            tags.apply(TagEvent::Increment { screen: ScreenId::Master });
            prop_assert!(tags.get(ScreenId::Master) < count);
            tags.apply(TagEvent::Decrement { screen: ScreenId::Master });
            prop_assert_eq!(tags.get(ScreenId::Master), start);
        }
    }
}
