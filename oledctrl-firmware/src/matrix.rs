//! Key matrix scanning
//!
//! Rows are driven high one at a time and the columns are read back with
//! pull-downs. Each position has its own debouncer: a change is accepted
//! once it has been seen for [`DEBOUNCE_MS`].

use embassy_rp::gpio::{Input, Output};
use embassy_time::{Duration, Instant, Timer};

/// How long a change must be seen before it counts
pub const DEBOUNCE_MS: u64 = 5;

/// Settle time between driving a row and reading the columns
const SETTLE_US: u64 = 1;

#[derive(Clone, Copy)]
struct Debouncer {
    state: bool,
    changed_at: Option<Instant>,
}

impl Debouncer {
    const fn new() -> Self {
        Self {
            state: false,
            changed_at: None,
        }
    }

    /// Feed a raw sample; returns the new state when it flips
    fn update(&mut self, raw: bool, now: Instant) -> Option<bool> {
        match self.changed_at {
            Some(at) if now - at >= Duration::from_millis(DEBOUNCE_MS) => {
                self.changed_at = None;
                if raw != self.state {
                    self.state = raw;
                    return Some(raw);
                }
                None
            }
            Some(_) => None,
            None => {
                if raw != self.state {
                    self.changed_at = Some(now);
                }
                None
            }
        }
    }
}

/// A debounced key change at a matrix position
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct KeyChange {
    pub row: usize,
    pub col: usize,
    pub pressed: bool,
}

pub struct Matrix<'a, const ROWS: usize, const COLS: usize> {
    rows: [Output<'a>; ROWS],
    cols: [Input<'a>; COLS],
    debouncers: [[Debouncer; COLS]; ROWS],
}

impl<'a, const ROWS: usize, const COLS: usize> Matrix<'a, ROWS, COLS> {
    pub fn new(rows: [Output<'a>; ROWS], cols: [Input<'a>; COLS]) -> Self {
        Self {
            rows,
            cols,
            debouncers: [[Debouncer::new(); COLS]; ROWS],
        }
    }

    /// Scan every position once and pass debounced changes to `on_change`
    pub async fn scan(&mut self, mut on_change: impl FnMut(KeyChange)) {
        for row in 0..ROWS {
            self.rows[row].set_high();
            Timer::after(Duration::from_micros(SETTLE_US)).await;

            let now = Instant::now();
            for col in 0..COLS {
                let raw = self.cols[col].is_high();
                if let Some(pressed) = self.debouncers[row][col].update(raw, now) {
                    on_change(KeyChange { row, col, pressed });
                }
            }
            self.rows[row].set_low();
        }
    }
}
