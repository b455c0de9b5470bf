//! Locked-cell grid: 32 rows of 8 cells, row 0 at the top (spawn end).

use log::warn;
use std::collections::VecDeque;
use thiserror::Error;

/// Number of rows (4 stacked 8x8 panels).
pub const ROWS: usize = 32;
/// Number of columns (one panel wide).
pub const COLS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({x}, {y}) is outside the 8x32 grid")]
    OutOfBounds { x: i32, y: i32 },
}

/// Fixed-size boolean matrix. Dimensions never change; only lock and clear mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// rows[y][x]; rows[0] is the top.
    rows: VecDeque<[bool; COLS]>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            rows: (0..ROWS).map(|_| [false; COLS]).collect(),
        }
    }

    #[inline]
    pub fn in_bounds(x: i32, y: i32) -> bool {
        (0..COLS as i32).contains(&x) && (0..ROWS as i32).contains(&y)
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> Result<bool, GridError> {
        if !Self::in_bounds(x, y) {
            return Err(GridError::OutOfBounds { x, y });
        }
        Ok(self.rows[y as usize][x as usize])
    }

    /// Occupancy test that treats anything outside the grid as empty.
    #[inline]
    pub fn occupied_or_empty(&self, x: i32, y: i32) -> bool {
        self.is_occupied(x, y).unwrap_or(false)
    }

    pub fn set_row(&mut self, y: i32, occupied: bool) -> Result<(), GridError> {
        if !(0..ROWS as i32).contains(&y) {
            return Err(GridError::OutOfBounds { x: 0, y });
        }
        self.rows[y as usize] = [occupied; COLS];
        Ok(())
    }

    /// Mark every in-bounds cell as occupied. Out-of-bounds cells are logged and skipped;
    /// returns how many were skipped.
    pub fn lock_cells<I>(&mut self, cells: I) -> usize
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut skipped = 0;
        for (x, y) in cells {
            if Self::in_bounds(x, y) {
                self.rows[y as usize][x as usize] = true;
            } else {
                warn!("lock skipped out-of-bounds cell ({x}, {y})");
                skipped += 1;
            }
        }
        skipped
    }

    /// Indices of fully occupied rows, top to bottom.
    pub fn find_complete_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|&c| c))
            .map(|(y, _)| y)
            .collect()
    }

    /// Remove the given rows and push an empty row in at the top for each one.
    ///
    /// Indices refer to the grid before the call. They are processed lowest first;
    /// removing row `y` and inserting at the top leaves every row below `y` where it
    /// was, so later (larger) indices still point at the intended rows.
    pub fn clear_rows(&mut self, indices: &[usize]) {
        let mut sorted: Vec<usize> = indices.iter().copied().filter(|&y| y < ROWS).collect();
        sorted.sort_unstable();
        sorted.dedup();
        for y in sorted {
            self.rows.remove(y);
            self.rows.push_front([false; COLS]);
        }
    }

    pub fn row(&self, y: usize) -> Option<&[bool; COLS]> {
        self.rows.get(y)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool; COLS]> {
        self.rows.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|&c| !c))
    }
}
