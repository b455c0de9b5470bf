//! Piece catalog and geometry: translation, rotation about the anchor, legality against a grid.

use crate::grid::Grid;
use rand::Rng;

/// Where every new piece enters: column 3, one row above the visible top.
pub const SPAWN_ANCHOR: (i32, i32) = (3, -1);

/// The seven catalog shapes (O, I, L, J, Z, S, T).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    O,
    I,
    L,
    J,
    Z,
    S,
    T,
}

impl Shape {
    pub const ALL: [Self; 7] = [Self::O, Self::I, Self::L, Self::J, Self::Z, Self::S, Self::T];

    /// Spawn-orientation offsets (dx, dy) relative to the anchor.
    pub fn offsets(&self) -> [(i32, i32); 4] {
        match self {
            Self::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            Self::I => [(0, 0), (1, 0), (2, 0), (3, 0)],
            Self::L => [(0, 0), (0, 1), (1, 1), (2, 1)],
            Self::J => [(0, 1), (1, 1), (2, 1), (2, 0)],
            Self::Z => [(0, 0), (1, 0), (1, 1), (2, 1)],
            Self::S => [(1, 0), (2, 0), (0, 1), (1, 1)],
            Self::T => [(1, 0), (0, 1), (1, 1), (2, 1)],
        }
    }

    /// Uniform draw from the catalog.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// +90 degrees.
    Clockwise,
    /// -90 degrees.
    CounterClockwise,
}

impl Rotation {
    pub fn degrees(&self) -> f64 {
        match self {
            Self::Clockwise => 90.0,
            Self::CounterClockwise => -90.0,
        }
    }
}

/// A shape's current offsets plus a board-relative anchor. Queries never mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub shape: Shape,
    pub offsets: [(i32, i32); 4],
    pub anchor: (i32, i32),
}

impl Piece {
    pub fn spawn(shape: Shape) -> Self {
        Self::new(shape, SPAWN_ANCHOR)
    }

    pub fn new(shape: Shape, anchor: (i32, i32)) -> Self {
        Self {
            shape,
            offsets: shape.offsets(),
            anchor,
        }
    }

    /// Absolute board cells (anchor + offset); no bounds checking.
    pub fn cells(&self) -> [(i32, i32); 4] {
        let (ax, ay) = self.anchor;
        self.offsets.map(|(dx, dy)| (ax + dx, ay + dy))
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            anchor: (self.anchor.0 + dx, self.anchor.1 + dy),
            ..*self
        }
    }

    /// Rotate every offset about the anchor (not the shape's centre) and round
    /// half away from zero. The anchor itself stays put.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let rad = rotation.degrees().to_radians();
        let (sin, cos) = rad.sin_cos();
        let offsets = self.offsets.map(|(dx, dy)| {
            let (fx, fy) = (dx as f64, dy as f64);
            (
                (cos * fx - sin * fy).round() as i32,
                (fx * sin + cos * fy).round() as i32,
            )
        });
        Self { offsets, ..*self }
    }

    /// Every cell inside the grid and not yet occupied.
    pub fn fits(&self, grid: &Grid) -> bool {
        self.cells()
            .iter()
            .all(|&(x, y)| matches!(grid.is_occupied(x, y), Ok(false)))
    }

    /// True if any cell sits on the floor or directly above a locked cell.
    /// Every cell is examined; one hit is enough to lock the whole piece.
    pub fn has_contact(&self, grid: &Grid) -> bool {
        let last_row = crate::grid::ROWS as i32 - 1;
        self.cells().iter().fold(false, |contact, &(x, y)| {
            let blocked = y >= last_row || grid.occupied_or_empty(x, y + 1);
            contact | blocked
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn cell_set(piece: &Piece) -> HashSet<(i32, i32)> {
        piece.cells().into_iter().collect()
    }

    #[test]
    fn test_spawn_cells() {
        let piece = Piece::spawn(Shape::O);
        assert_eq!(cell_set(&piece), HashSet::from([(3, -1), (4, -1), (3, 0), (4, 0)]));
    }

    #[test]
    fn test_translated_leaves_original() {
        let piece = Piece::new(Shape::T, (2, 5));
        let moved = piece.translated(-1, 2);
        assert_eq!(piece.anchor, (2, 5));
        assert_eq!(moved.anchor, (1, 7));
        assert_eq!(moved.offsets, piece.offsets);
    }

    #[test]
    fn test_rotate_i_about_anchor() {
        let piece = Piece::new(Shape::I, (3, 10));
        let cw = piece.rotated(Rotation::Clockwise);
        assert_eq!(cw.offsets, [(0, 0), (0, 1), (0, 2), (0, 3)]);
        let ccw = piece.rotated(Rotation::CounterClockwise);
        assert_eq!(ccw.offsets, [(0, 0), (0, -1), (0, -2), (0, -3)]);
        assert_eq!(cw.anchor, piece.anchor);
    }

    #[test]
    fn test_rotate_t_clockwise() {
        // (dx, dy) -> (-dy, dx)
        let piece = Piece::new(Shape::T, (4, 4));
        let cw = piece.rotated(Rotation::Clockwise);
        assert_eq!(cw.offsets, [(0, 1), (-1, 0), (-1, 1), (-1, 2)]);
    }

    #[test]
    fn test_rotate_round_trip_all_shapes() {
        let mut rng = StdRng::seed_from_u64(0x0da7);
        for _ in 0..300 {
            let shape = Shape::ALL[rng.gen_range(0..Shape::ALL.len())];
            let anchor = (rng.gen_range(-4..12), rng.gen_range(-4..36));
            let mut piece = Piece::new(shape, anchor);
            for _ in 0..rng.gen_range(0..4) {
                piece = piece.rotated(Rotation::Clockwise);
            }
            let back = piece
                .rotated(Rotation::Clockwise)
                .rotated(Rotation::CounterClockwise);
            assert_eq!(cell_set(&back), cell_set(&piece), "{shape:?}");
            let back = piece
                .rotated(Rotation::CounterClockwise)
                .rotated(Rotation::Clockwise);
            assert_eq!(cell_set(&back), cell_set(&piece), "{shape:?}");
        }
    }

    #[test]
    fn test_four_rotations_return_home() {
        for shape in Shape::ALL {
            let piece = Piece::new(shape, (3, 10));
            let mut p = piece;
            for _ in 0..4 {
                p = p.rotated(Rotation::Clockwise);
            }
            assert_eq!(p.offsets, piece.offsets, "{shape:?}");
        }
    }

    #[test]
    fn test_fits_rejects_out_of_bounds_and_occupied() {
        let mut grid = Grid::new();
        assert!(!Piece::spawn(Shape::O).fits(&grid));
        let piece = Piece::new(Shape::O, (3, 10));
        assert!(piece.fits(&grid));
        assert!(!Piece::new(Shape::O, (7, 10)).fits(&grid));
        grid.lock_cells([(4, 11)]);
        assert!(!piece.fits(&grid));
    }

    #[test]
    fn test_contact_floor_and_stack() {
        let mut grid = Grid::new();
        assert!(!Piece::new(Shape::O, (3, 29)).has_contact(&grid));
        assert!(Piece::new(Shape::O, (3, 30)).has_contact(&grid));
        grid.lock_cells([(4, 20)]);
        assert!(Piece::new(Shape::O, (3, 18)).has_contact(&grid));
        assert!(!Piece::new(Shape::O, (5, 18)).has_contact(&grid));
    }

    #[test]
    fn test_random_covers_catalog() {
        let mut rng = StdRng::seed_from_u64(3);
        let seen: HashSet<_> = (0..500)
            .map(|_| Shape::random(&mut rng))
            .collect();
        assert_eq!(seen.len(), Shape::ALL.len());
    }
}
