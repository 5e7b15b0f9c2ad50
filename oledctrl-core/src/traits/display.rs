//! Character display trait
//!
//! The protocol engine never touches pixels. It writes characters into a
//! cell grid; the firmware turns that grid into OLED pixels.

use crate::config::Geometry;

/// Errors that can occur when writing to a character display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the panel
    Communication,
    /// Display not initialized
    NotInitialized,
    /// Wrote past the last cell
    BufferOverflow,
}

/// A display addressed in character cells.
///
/// Writes advance a cursor left to right and wrap to the next row, the way
/// a terminal does.
pub trait CharDisplay {
    /// Blank every cell and move the cursor home
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write one character at the cursor
    ///
    /// `\n` moves the cursor to the start of the next row.
    fn write_char(&mut self, c: u8) -> Result<(), DisplayError>;

    /// Number of character columns
    fn cols(&self) -> u8;

    /// Number of character rows
    fn rows(&self) -> u8;

    /// Write bytes until the slice ends or a zero byte is reached
    fn write_str(&mut self, s: &[u8]) -> Result<(), DisplayError> {
        for &c in s.iter().take_while(|&&c| c != 0) {
            self.write_char(c)?;
        }
        Ok(())
    }

    /// Write bytes followed by a line break
    fn write_line(&mut self, s: &[u8]) -> Result<(), DisplayError> {
        self.write_str(s)?;
        self.write_char(b'\n')
    }

    /// Grid size, for the set-up response
    fn geometry(&self) -> Geometry {
        Geometry::new(self.cols(), self.rows())
    }
}
