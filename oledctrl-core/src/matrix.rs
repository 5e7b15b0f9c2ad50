//! In-memory character matrix
//!
//! A [`CharDisplay`] backed by a plain cell grid. The render loop draws a
//! fresh matrix every frame and only pushes it to the panel when it differs
//! from the one shown last.

use crate::config::{ConfigError, Geometry};
use crate::traits::{CharDisplay, DisplayError};

/// Character grid with a write cursor
#[derive(Clone, PartialEq, Eq)]
pub struct CharMatrix<const CELLS: usize> {
    geometry: Geometry,
    cells: [u8; CELLS],
    cursor: usize,
    dirty: bool,
}

impl<const CELLS: usize> CharMatrix<CELLS> {
    pub fn new(geometry: Geometry) -> Result<Self, ConfigError> {
        geometry.validate(CELLS)?;
        Ok(Self {
            geometry,
            cells: [b' '; CELLS],
            cursor: 0,
            dirty: true,
        })
    }

    /// Row `row` as bytes
    pub fn line(&self, row: u8) -> Option<&[u8]> {
        if row >= self.geometry.rows {
            return None;
        }
        let cols = self.geometry.cols as usize;
        let start = row as usize * cols;
        self.cells.get(start..start + cols)
    }

    /// All rows as bytes
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.geometry.rows).filter_map(move |row| self.line(row))
    }

    /// Copy `source` in if its content differs; returns whether it changed
    pub fn update_from(&mut self, source: &Self) -> bool {
        let cells = self.geometry.cells();
        if self.cells[..cells] != source.cells[..cells] {
            self.cells[..cells].copy_from_slice(&source.cells[..cells]);
            self.dirty = true;
        }
        self.dirty
    }

    /// Check if the panel needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark as drawn
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn newline(&mut self) {
        let cols = self.geometry.cols as usize;
        self.cursor = (self.cursor / cols + 1) * cols;
    }
}

impl<const CELLS: usize> CharDisplay for CharMatrix<CELLS> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.cells.fill(b' ');
        self.cursor = 0;
        self.dirty = true;
        Ok(())
    }

    fn write_char(&mut self, c: u8) -> Result<(), DisplayError> {
        if c == b'\n' {
            self.newline();
            return Ok(());
        }
        if self.cursor >= self.geometry.cells() {
            return Err(DisplayError::BufferOverflow);
        }
        self.cells[self.cursor] = c;
        self.cursor += 1;
        self.dirty = true;
        Ok(())
    }

    fn cols(&self) -> u8 {
        self.geometry.cols
    }

    fn rows(&self) -> u8 {
        self.geometry.rows
    }
}

impl<const CELLS: usize> core::fmt::Debug for CharMatrix<CELLS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut list = f.debug_list();
        for line in self.lines() {
            list.entry(&core::str::from_utf8(line).unwrap_or("<binary>"));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> CharMatrix<12> {
        CharMatrix::new(Geometry::new(4, 3)).unwrap()
    }

    #[test]
    fn test_write_wraps_rows() {
        let mut m = matrix();
        m.write_str(b"abcdef").unwrap();
        assert_eq!(m.line(0), Some(&b"abcd"[..]));
        assert_eq!(m.line(1), Some(&b"ef  "[..]));
    }

    #[test]
    fn test_write_line_breaks() {
        let mut m = matrix();
        m.write_line(b"ab").unwrap();
        m.write_str(b"cd").unwrap();
        assert_eq!(m.line(0), Some(&b"ab  "[..]));
        assert_eq!(m.line(1), Some(&b"cd  "[..]));
    }

    #[test]
    fn test_write_str_stops_at_zero() {
        let mut m = matrix();
        m.write_str(b"ab\0cd").unwrap();
        assert_eq!(m.line(0), Some(&b"ab  "[..]));
    }

    #[test]
    fn test_overflow() {
        let mut m = matrix();
        m.write_str(&[b'x'; 12]).unwrap();
        assert_eq!(m.write_char(b'y'), Err(DisplayError::BufferOverflow));
    }

    #[test]
    fn test_update_from_tracks_changes() {
        let mut shown = matrix();
        shown.mark_clean();

        let same = matrix();
        assert!(!shown.update_from(&same));

        let mut changed = matrix();
        changed.write_str(b"hi").unwrap();
        assert!(shown.update_from(&changed));
        assert_eq!(shown.line(0), Some(&b"hi  "[..]));
    }
}
