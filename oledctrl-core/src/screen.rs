//! Double-buffered screen content
//!
//! The host composes a screen line by line in the back buffer and then
//! presents it, copying the whole back buffer to the front buffer in one
//! step. The render path only ever reads the front buffer.
//!
//! ```text
//!   set_line ──► back ──present──► front ──► renderer ──► display
//!   clear ─────► back = spaces,    front = zeros
//! ```
//!
//! A front buffer starting with a zero byte has no content, and the display
//! shows its default (not host-controlled) screen.

use crate::config::{ConfigError, Geometry};

/// Escape byte that introduces a render-time variable
pub const VARIABLE_ESCAPE: u8 = b'%';

/// Buffer store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// `set_line` addressed a row past the bottom of the screen
    LineOutOfBounds { line: u8, rows: u8 },
}

/// Front and back character buffers for the local screen.
///
/// `CELLS` is the compile-time capacity; the active grid is the runtime
/// [`Geometry`] reported by the display, which must fit in it.
#[derive(Clone)]
pub struct ScreenBuffers<const CELLS: usize> {
    geometry: Geometry,
    /// Content being shown (may contain unexpanded escapes)
    front: [u8; CELLS],
    /// Content being composed
    back: [u8; CELLS],
    /// Whether `front` holds a `%`
    has_variables: bool,
    /// Whether a line was set since the last clear
    composed: bool,
}

impl<const CELLS: usize> ScreenBuffers<CELLS> {
    /// Create empty buffers: no front content, blank back buffer
    pub fn new(geometry: Geometry) -> Result<Self, ConfigError> {
        geometry.validate(CELLS)?;
        Ok(Self {
            geometry,
            front: [0; CELLS],
            back: [b' '; CELLS],
            has_variables: false,
            composed: false,
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn cells(&self) -> usize {
        self.geometry.cells()
    }

    /// Drop all content: front becomes empty, back becomes blank
    pub fn clear(&mut self) {
        self.front.fill(0);
        self.back.fill(b' ');
        self.has_variables = false;
        self.composed = false;
    }

    /// Clear, and report the grid size to the host
    pub fn set_up(&mut self) -> Geometry {
        self.clear();
        self.geometry
    }

    /// Replace one row of the back buffer.
    ///
    /// At most `cols` bytes of `text` are used; the rest of the row is padded
    /// with spaces. Nothing outside the row is touched.
    pub fn set_line(&mut self, line: u8, text: &[u8]) -> Result<(), BufferError> {
        let Geometry { cols, rows } = self.geometry;
        if line >= rows {
            return Err(BufferError::LineOutOfBounds { line, rows });
        }

        let cols = cols as usize;
        let start = line as usize * cols;
        let row = &mut self.back[start..start + cols];
        let len = text.len().min(cols);
        row[..len].copy_from_slice(&text[..len]);
        row[len..].fill(b' ');
        self.composed = true;
        Ok(())
    }

    /// Show the back buffer.
    ///
    /// Presenting right after a clear keeps the front buffer empty, so the
    /// display goes back to its default screen instead of a blank one.
    pub fn present(&mut self) {
        if !self.composed {
            self.front.fill(0);
            self.has_variables = false;
            return;
        }
        let cells = self.cells();
        self.front[..cells].copy_from_slice(&self.back[..cells]);
        // Cells past the grid act as the terminator
        self.front[cells..].fill(0);
        self.has_variables = self.front[..cells].contains(&VARIABLE_ESCAPE);
    }

    /// Whether the host has put something on the screen
    pub fn has_content(&self) -> bool {
        self.front.first().is_some_and(|&b| b != 0)
    }

    /// Whether the front buffer needs variable expansion when drawn
    pub fn has_variables(&self) -> bool {
        self.has_variables
    }

    /// Front buffer grid, row-major
    pub fn front(&self) -> &[u8] {
        &self.front[..self.cells()]
    }

    /// Back buffer grid, row-major
    pub fn back(&self) -> &[u8] {
        &self.back[..self.cells()]
    }

    pub fn front_line(&self, row: u8) -> Option<&[u8]> {
        line_of(self.front(), self.geometry, row)
    }

    pub fn back_line(&self, row: u8) -> Option<&[u8]> {
        line_of(self.back(), self.geometry, row)
    }
}

fn line_of(grid: &[u8], geometry: Geometry, row: u8) -> Option<&[u8]> {
    if row >= geometry.rows {
        return None;
    }
    let cols = geometry.cols as usize;
    let start = row as usize * cols;
    grid.get(start..start + cols)
}
