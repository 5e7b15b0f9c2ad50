//! Master to slave relay
//!
//! The host only talks to the master half. Commands for the slave screen
//! are parked in a single-slot [`Mailbox`] on the master, carried over the
//! split link by the firmware, and land in the slave's [`Inbox`] where
//! [`deliver`] feeds them to the local dispatcher.
//!
//! There is one slot and no backpressure: a newer frame replaces one that
//! was not sent yet.

use oledctrl_protocol::FRAME_LEN;

use crate::dispatch::{DispatchError, Dispatcher, Outcome};

fn zero_filled(bytes: &[u8]) -> [u8; FRAME_LEN] {
    let mut message = [0u8; FRAME_LEN];
    let n = bytes.len().min(FRAME_LEN);
    message[..n].copy_from_slice(&bytes[..n]);
    message
}

/// Outbound slot on the master
#[derive(Debug, Clone)]
pub struct Mailbox {
    message: [u8; FRAME_LEN],
    pending: bool,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            message: [0; FRAME_LEN],
            pending: false,
        }
    }

    /// Park a frame for the slave.
    ///
    /// Returns `true` if an unsent frame was overwritten.
    pub fn send(&mut self, bytes: &[u8]) -> bool {
        let overwritten = self.pending;
        self.message = zero_filled(bytes);
        self.pending = true;
        overwritten
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Mark the frame as sent
    pub fn clear_pending(&mut self) {
        self.pending = false;
    }

    /// Copy of the parked frame, sent or not
    pub fn sync_info(&self) -> [u8; FRAME_LEN] {
        self.message
    }

    /// Take the pending frame, if any
    pub fn take(&mut self) -> Option<[u8; FRAME_LEN]> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(self.message)
    }
}

/// Inbound slot on the slave
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    message: [u8; FRAME_LEN],
    fresh: bool,
}

impl Inbox {
    pub const fn new() -> Self {
        Self {
            message: [0; FRAME_LEN],
            fresh: false,
        }
    }

    /// Store the frame the link just received
    pub fn update_sync(&mut self, bytes: &[u8]) {
        self.message = zero_filled(bytes);
        self.fresh = true;
    }

    pub fn has_message(&self) -> bool {
        self.fresh
    }

    /// Take the received frame once
    pub fn take(&mut self) -> Option<[u8; FRAME_LEN]> {
        if !self.fresh {
            return None;
        }
        self.fresh = false;
        Some(self.message)
    }
}

/// Run a received frame through the slave's dispatcher.
///
/// Returns `None` when the inbox was empty.
pub fn deliver<const CELLS: usize>(
    inbox: &mut Inbox,
    dispatcher: &mut Dispatcher<CELLS>,
) -> Option<Result<Outcome, DispatchError>> {
    let message = inbox.take()?;
    Some(dispatcher.handle_relayed(&message))
}
