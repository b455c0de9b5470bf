//! Renderable frames and the sinks that paint them.

use crate::grid::{COLS, Grid, ROWS};
use log::warn;
use std::io::Write;
use std::time::Duration;

/// Rows per LED panel; the frame is four panels stacked top to bottom.
pub const PANEL_ROWS: usize = 8;
pub const PANEL_COUNT: usize = ROWS / PANEL_ROWS;

/// One 8x8 LED module, rows[y][x].
pub type Panel = [[bool; COLS]; PANEL_ROWS];

/// Scratch copy of the grid with the falling piece overlaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    rows: [[bool; COLS]; ROWS],
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            rows: [[false; COLS]; ROWS],
        }
    }
}

impl From<&Grid> for Frame {
    fn from(grid: &Grid) -> Self {
        let mut frame = Self::default();
        for (dst, src) in frame.rows.iter_mut().zip(grid.rows()) {
            *dst = *src;
        }
        frame
    }
}

impl Frame {
    /// Light the given cells; anything off the board is ignored.
    pub fn overlay<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        for (x, y) in cells {
            if Grid::in_bounds(x, y) {
                self.rows[y as usize][x as usize] = true;
            }
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    pub fn rows(&self) -> &[[bool; COLS]; ROWS] {
        &self.rows
    }

    /// Row packed MSB-first: column 0 is bit 7.
    pub fn row_bits(&self, y: usize) -> u8 {
        self.rows.get(y).map_or(0, |row| {
            row.iter()
                .fold(0u8, |bits, &lit| (bits << 1) | u8::from(lit))
        })
    }

    /// The four stacked 8x8 modules; panel 0 holds rows 0..8.
    pub fn panels(&self) -> [Panel; PANEL_COUNT] {
        std::array::from_fn(|p| {
            std::array::from_fn(|y| self.rows[p * PANEL_ROWS + y])
        })
    }

    pub fn lit_count(&self) -> usize {
        self.rows.iter().flatten().filter(|&&lit| lit).count()
    }
}

/// Engine phase as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Falling,
    Clearing,
    Stopped,
}

/// Side information a sink may show next to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub score: u32,
    pub lines: u32,
    pub interval: Duration,
    pub phase: Phase,
}

/// Anything that can paint a frame. Draws are serialized by the caller.
pub trait RenderSink {
    fn draw(&mut self, frame: &Frame);

    /// Called right before `draw` with the current stats.
    fn report(&mut self, _stats: &Stats) {}
}

/// Writes each frame as 32 lines of `0`/`1` plus a blank separator line, for an
/// external display-driver process to consume.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, frame: &Frame) -> std::io::Result<()> {
        for row in frame.rows() {
            let line: String = row.iter().map(|&lit| if lit { '1' } else { '0' }).collect();
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> RenderSink for TextSink<W> {
    fn draw(&mut self, frame: &Frame) {
        if let Err(e) = self.write_frame(frame) {
            warn!("text sink write failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_from_grid_and_overlay() {
        let mut grid = Grid::new();
        grid.set_row(31, true).unwrap();
        let mut frame = Frame::from(&grid);
        frame.overlay([(3, -1), (3, 0), (4, 0)]);
        assert!(frame.get(3, 0) && frame.get(4, 0));
        assert!(frame.get(0, 31));
        assert_eq!(frame.lit_count(), COLS + 2);
        assert!(!grid.occupied_or_empty(3, 0));
    }

    #[test]
    fn test_row_bits_msb_first() {
        let mut frame = Frame::default();
        frame.overlay([(0, 2), (7, 2), (1, 3)]);
        assert_eq!(frame.row_bits(2), 0b1000_0001);
        assert_eq!(frame.row_bits(3), 0b0100_0000);
        assert_eq!(frame.row_bits(40), 0);
    }

    #[test]
    fn test_panels_split() {
        let mut frame = Frame::default();
        frame.overlay([(2, 0), (5, 9), (7, 31)]);
        let panels = frame.panels();
        assert!(panels[0][0][2]);
        assert!(panels[1][1][5]);
        assert!(panels[3][7][7]);
        let lit: usize = panels
            .iter()
            .flat_map(|p| p.iter().flatten())
            .filter(|&&c| c)
            .count();
        assert_eq!(lit, 3);
    }

    #[test]
    fn test_text_sink_output() {
        let mut frame = Frame::default();
        frame.overlay([(0, 0), (7, 31)]);
        let mut sink = TextSink::new(Vec::new());
        sink.draw(&frame);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), ROWS + 1);
        assert_eq!(lines[0], "10000000");
        assert_eq!(lines[31], "00000001");
        assert_eq!(lines[32], "");
    }
}
