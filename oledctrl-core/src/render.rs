//! Draw-time variable expansion
//!
//! The front buffer may hold `%` escapes. They are expanded every time the
//! screen is drawn, so a line like `Layer: %l` follows the active layer
//! without the host resending anything.
//!
//! Expansion works row by row. Each row starts at `row * cols` in the
//! front buffer, so a long expansion cuts off the rest of its own row but
//! never shifts the rows below it. A zero byte ends its row; a `%` right
//! before a zero or the end of the buffer ends the whole screen.

use core::fmt;

use crate::screen::{ScreenBuffers, VARIABLE_ESCAPE};
use crate::traits::{CharDisplay, DisplayError};

/// Capacity of the expansion buffer, terminator included
pub const EXPANSION_CAPACITY: usize = 32;

/// Source of the active layer name.
///
/// Implemented for closures so a keymap can hand in whatever it has.
pub trait LayerNames {
    fn write_layer_name(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

impl<F> LayerNames for F
where
    F: Fn(&mut dyn fmt::Write) -> fmt::Result,
{
    fn write_layer_name(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        self(out)
    }
}

/// Variables the renderer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variable {
    /// `%l`: name of the highest active layer
    LayerName,
}

impl Variable {
    fn from_selector(byte: u8) -> Option<Self> {
        match byte {
            b'l' => Some(Variable::LayerName),
            _ => None,
        }
    }
}

/// Bounded writer that keeps the first `limit` bytes and counts the rest
struct Expansion {
    bytes: heapless::Vec<u8, EXPANSION_CAPACITY>,
    limit: usize,
    pos: usize,
    total: usize,
}

impl Expansion {
    const fn empty() -> Self {
        Self::with_limit(0)
    }

    const fn with_limit(limit: usize) -> Self {
        Self {
            bytes: heapless::Vec::new(),
            limit,
            pos: 0,
            total: 0,
        }
    }

    fn width(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Write for Expansion {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.total += s.len();
        let room = self.limit.saturating_sub(self.bytes.len());
        let n = s.len().min(room);
        self.bytes
            .extend_from_slice(&s.as_bytes()[..n])
            .map_err(|_| fmt::Error)
    }
}

impl Iterator for Expansion {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }
}

/// Iterator over the bytes to draw for one frame
pub struct Render<'a, L: ?Sized> {
    cells: &'a [u8],
    cols: usize,
    rows: usize,
    expand: bool,
    layers: &'a L,
    row: usize,
    col: usize,
    index: usize,
    pending: Expansion,
    done: bool,
}

impl<'a, L: LayerNames + ?Sized> Render<'a, L> {
    fn expand(&self, variable: Variable, limit: usize) -> Expansion {
        let mut out = Expansion::with_limit(limit);
        // A failing provider still shows whatever it wrote
        let _ = match variable {
            Variable::LayerName => self.layers.write_layer_name(&mut out),
        };
        out
    }

    fn next_verbatim(&mut self) -> Option<u8> {
        match self.cells.get(self.index) {
            Some(&b) if b != 0 => {
                self.index += 1;
                Some(b)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }

    fn finish(&mut self) -> Option<u8> {
        self.done = true;
        None
    }
}

impl<'a, L: LayerNames + ?Sized> Iterator for Render<'a, L> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            if let Some(b) = self.pending.next() {
                return Some(b);
            }
            if self.done {
                return None;
            }
            if !self.expand {
                return self.next_verbatim();
            }

            if self.col >= self.cols {
                self.row += 1;
                self.col = 0;
                self.index = self.row * self.cols;
            }
            if self.row >= self.rows {
                return self.finish();
            }

            let byte = match self.cells.get(self.index) {
                // A zero only ends its own row
                Some(0) => {
                    self.col = self.cols;
                    continue;
                }
                Some(&b) => b,
                None => return self.finish(),
            };

            if byte == VARIABLE_ESCAPE {
                let selector = match self.cells.get(self.index + 1) {
                    Some(&s) if s != 0 => s,
                    _ => return self.finish(),
                };
                if let Some(variable) = Variable::from_selector(selector) {
                    let limit = (self.cols - self.col).min(self.cols.min(EXPANSION_CAPACITY) - 1);
                    let expansion = self.expand(variable, limit);
                    if expansion.total > 0 {
                        self.index += 2;
                        self.col += expansion.width();
                        self.pending = expansion;
                        continue;
                    }
                }
            }

            self.index += 1;
            self.col += 1;
            return Some(byte);
        }
    }
}

impl<const CELLS: usize> ScreenBuffers<CELLS> {
    /// Bytes to draw for the current front buffer
    pub fn render<'a, L: LayerNames + ?Sized>(&'a self, layers: &'a L) -> Render<'a, L> {
        let geometry = self.geometry();
        Render {
            cells: self.front(),
            cols: geometry.cols as usize,
            rows: geometry.rows as usize,
            expand: self.has_variables(),
            layers,
            row: 0,
            col: 0,
            index: 0,
            pending: Expansion::empty(),
            done: false,
        }
    }

    /// Draw the host-controlled content.
    ///
    /// Returns `Ok(false)` without touching the display when there is no
    /// content; the caller then draws its default screen.
    pub fn draw<D, L>(&self, layers: &L, display: &mut D) -> Result<bool, DisplayError>
    where
        D: CharDisplay + ?Sized,
        L: LayerNames + ?Sized,
    {
        if !self.has_content() {
            return Ok(false);
        }
        for b in self.render(layers) {
            display.write_char(b)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Geometry;
    use crate::matrix::CharMatrix;
    use core::fmt::Write;

    fn lower(out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str("Lower")
    }

    fn no_layer(_: &mut dyn fmt::Write) -> fmt::Result {
        Ok(())
    }

    fn rendered<const N: usize>(b: &ScreenBuffers<N>, layers: &dyn LayerNames) -> Vec<u8> {
        b.render(layers).collect()
    }

    fn screen<const N: usize>(cols: u8, rows: u8, lines: &[&[u8]]) -> ScreenBuffers<N> {
        let mut b = ScreenBuffers::new(Geometry::new(cols, rows)).unwrap();
        for (i, line) in lines.iter().enumerate() {
            b.set_line(i as u8, line).unwrap();
        }
        b.present();
        b
    }

    #[test]
    fn test_verbatim_without_variables() {
        let b: ScreenBuffers<8> = screen(4, 2, &[b"ab", b"cd"]);
        assert_eq!(rendered(&b, &lower), b"ab  cd  ");
    }

    #[test]
    fn test_empty_front_renders_nothing() {
        let b: ScreenBuffers<8> = ScreenBuffers::new(Geometry::new(4, 2)).unwrap();
        assert!(rendered(&b, &lower).is_empty());
    }

    #[test]
    fn test_layer_name() {
        let b: ScreenBuffers<84> = screen(21, 1, &[b"Layer: %l"]);
        let out = rendered(&b, &lower);
        assert_eq!(&out[..12], b"Layer: Lower");
        assert_eq!(out.len(), 21);
        assert!(out[12..].iter().all(|&c| c == b' '));
    }

    #[test]
    fn test_layer_name_truncated_on_narrow_display() {
        let b: ScreenBuffers<20> = screen(10, 2, &[b"Layer: %l", b"next"]);
        let out = rendered(&b, &lower);
        assert_eq!(&out[..10], b"Layer: Low");
        // Second row is unaffected
        assert_eq!(&out[10..], b"next      ");
    }

    #[test]
    fn test_expansion_capped_below_width() {
        let b: ScreenBuffers<6> = screen(6, 1, &[b"%l"]);
        let out = rendered(&b, &lower);
        assert_eq!(&out[..5], b"Lower");

        let b: ScreenBuffers<5> = screen(5, 1, &[b"%l"]);
        let out = rendered(&b, &lower);
        assert_eq!(&out[..4], b"Lowe");
    }

    #[test]
    fn test_dangling_escape_ends_output() {
        let b: ScreenBuffers<4> = screen(4, 1, &[b"abc%"]);
        assert_eq!(rendered(&b, &lower), b"abc");
    }

    #[test]
    fn test_escape_before_zero_ends_output() {
        let b: ScreenBuffers<8> = screen(4, 2, &[b"a%\0b", b"cd"]);
        assert_eq!(rendered(&b, &lower), b"a");
    }

    #[test]
    fn test_zero_ends_only_its_row() {
        let b: ScreenBuffers<8> = screen(4, 2, &[b"a\0%l", b"cd"]);
        assert_eq!(rendered(&b, &lower), b"acd  ");
    }

    #[test]
    fn test_zero_on_last_row_ends_output() {
        let b: ScreenBuffers<8> = screen(4, 2, &[b"%l", b"x\0yz"]);
        assert_eq!(rendered(&b, &lower), b"Low x");
    }

    #[test]
    fn test_unknown_selector_prints_escape() {
        let b: ScreenBuffers<8> = screen(8, 1, &[b"50%x"]);
        assert_eq!(rendered(&b, &lower), b"50%x    ");
    }

    #[test]
    fn test_empty_layer_name_prints_escape() {
        let b: ScreenBuffers<4> = screen(4, 1, &[b"%l"]);
        assert_eq!(rendered(&b, &no_layer), b"%l  ");
    }

    #[test]
    fn test_render_is_restartable() {
        let b: ScreenBuffers<21> = screen(21, 1, &[b"%l"]);
        assert_eq!(rendered(&b, &lower), rendered(&b, &lower));
    }

    #[test]
    fn test_closure_layer_names() {
        let layer = 3u8;
        let names = move |out: &mut dyn fmt::Write| write!(out, "L{}", layer);
        let b: ScreenBuffers<8> = screen(8, 1, &[b"[%l]"]);
        assert_eq!(rendered(&b, &names), b"[L3]    ");
    }

    #[test]
    fn test_draw_writes_to_display() {
        let b: ScreenBuffers<8> = screen(4, 2, &[b"%l", b"ok"]);
        let mut m: CharMatrix<8> = CharMatrix::new(Geometry::new(4, 2)).unwrap();
        assert_eq!(b.draw(&lower, &mut m), Ok(true));
        assert_eq!(m.line(0), Some(&b"Low "[..]));
        assert_eq!(m.line(1), Some(&b"ok  "[..]));
    }

    #[test]
    fn test_draw_without_content() {
        let b: ScreenBuffers<8> = ScreenBuffers::new(Geometry::new(4, 2)).unwrap();
        let mut m: CharMatrix<8> = CharMatrix::new(Geometry::new(4, 2)).unwrap();
        m.mark_clean();
        assert_eq!(b.draw(&lower, &mut m), Ok(false));
        assert!(!m.is_dirty());
    }
}
