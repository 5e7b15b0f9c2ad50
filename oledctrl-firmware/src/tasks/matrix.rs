//! Key matrix task
//!
//! Scans the matrix, resolves changes through the keymap and publishes
//! key events and the layer state for the other tasks.

use defmt::*;
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use oledctrl_core::Keymap;

use crate::channels::{KeyEvent, KEY_EVENTS, LAYER_STATE, SCREEN_CHANGED};
use crate::keymap::{COLS, ROWS};
use crate::matrix::{KeyChange, Matrix};

/// Scan period
const SCAN_INTERVAL_MS: u64 = 1;

/// Matrix task - feeds key events and layer state
#[embassy_executor::task]
pub async fn matrix_task(
    mut matrix: Matrix<'static, ROWS, COLS>,
    mut keymap: Keymap<'static, ROWS, COLS>,
) {
    info!("Matrix task started");

    let mut ticker = Ticker::every(Duration::from_millis(SCAN_INTERVAL_MS));

    loop {
        matrix
            .scan(|change| handle_change(&mut keymap, change))
            .await;

        ticker.next().await;
    }
}

fn handle_change(keymap: &mut Keymap<'static, ROWS, COLS>, change: KeyChange) {
    trace!("Key change: {:?}", change);
    let before = keymap.layer_state();
    let key = keymap.process(change.row, change.col, change.pressed);

    let after = keymap.layer_state();
    if after != before {
        LAYER_STATE.store(after, Ordering::Relaxed);
        debug!("Layer state: {=u32:b}", after);
        SCREEN_CHANGED.signal(());
    }

    if let Some(key) = key {
        let event = KeyEvent {
            key,
            pressed: change.pressed,
        };
        if KEY_EVENTS.try_send(event).is_err() {
            warn!("Key event queue full, dropping {:?}", event);
        }
    }
}
