//! Tag key task
//!
//! Runs key events from the keymap through the tag selector and sends
//! the resulting events to the host.

use defmt::*;

use oledctrl_core::{EmitError, EventEmitter, KeyOutcome, Role, TagSelector};

use crate::channels::KEY_EVENTS;
use crate::hid::EventQueue;

/// Key task - turns tag keys into host events
#[embassy_executor::task]
pub async fn keys_task(role: Role) {
    info!("Keys task started");

    let mut selector = TagSelector::new();
    let mut emitter = EventEmitter::new(role, EventQueue);

    loop {
        let event = KEY_EVENTS.receive().await;

        match selector.process(event.key, event.pressed) {
            KeyOutcome::Emit(tag_event) => match emitter.emit(tag_event) {
                Ok(()) => debug!("Tag event: {:?}", tag_event),
                Err(EmitError::NotMaster) => trace!("Tag event ignored on slave"),
                // Already logged by the queue
                Err(EmitError::Sink(())) => {}
            },
            KeyOutcome::Consumed => {}
            KeyOutcome::PassThrough => {
                trace!("Key {:?} passed through", event.key);
            }
        }
    }
}
