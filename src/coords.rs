//! Cell and pixel coordinates
//!
//! Grid cells are addressed by `(x, y)` where `x` is the column and `y` the
//! row, with `(0, 0)` at the top-left. Pixel positions are signed because the
//! pointer can sit above or left of the canvas origin.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A grid cell coordinate.
///
/// Ordered row-major (by `y`, then `x`), which is the order aux records are
/// written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

impl CellCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Convert a signed cell position, returning `None` for negative components.
    pub fn from_signed(x: i64, y: i64) -> Option<Self> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        Some(Self { x, y })
    }
}

impl Ord for CellCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for CellCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A pointer position in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The signed cell containing this pixel at the given cell size.
    ///
    /// Uses floor division, so `-1` maps to cell `-1` rather than `0`.
    pub fn to_cell(self, cell_size: u32) -> (i64, i64) {
        let size = i64::from(cell_size.max(1));
        (i64::from(self.x).div_euclid(size), i64::from(self.y).div_euclid(size))
    }
}

/// Top-left pixel of a signed cell position.
pub fn cell_origin(x: i64, y: i64, cell_size: u32) -> (i64, i64) {
    let size = i64::from(cell_size);
    (x * size, y * size)
}

/// Signed cell positions of the square of half-width `radius` around
/// `center`, in row-major order.
pub fn square_around(center: (i64, i64), radius: u32) -> impl Iterator<Item = (i64, i64)> {
    let r = i64::from(radius);
    let (cx, cy) = center;
    ((cy - r)..=(cy + r)).flat_map(move |y| ((cx - r)..=(cx + r)).map(move |x| (x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_cell_positive() {
        assert_eq!(PixelPos::new(0, 0).to_cell(16), (0, 0));
        assert_eq!(PixelPos::new(15, 16).to_cell(16), (0, 1));
        assert_eq!(PixelPos::new(47, 33).to_cell(16), (2, 2));
    }

    #[test]
    fn test_to_cell_floors_negative() {
        assert_eq!(PixelPos::new(-1, -1).to_cell(16), (-1, -1));
        assert_eq!(PixelPos::new(-16, -17).to_cell(16), (-1, -2));
    }

    #[test]
    fn test_to_cell_zero_size() {
        assert_eq!(PixelPos::new(5, 7).to_cell(0), (5, 7));
    }

    #[test]
    fn test_from_signed() {
        assert_eq!(CellCoord::from_signed(3, 4), Some(CellCoord::new(3, 4)));
        assert_eq!(CellCoord::from_signed(-1, 4), None);
        assert_eq!(CellCoord::from_signed(0, -2), None);
    }

    #[test]
    fn test_row_major_order() {
        let mut coords = vec![CellCoord::new(2, 1), CellCoord::new(0, 2), CellCoord::new(5, 0)];
        coords.sort();
        assert_eq!(coords, vec![CellCoord::new(5, 0), CellCoord::new(2, 1), CellCoord::new(0, 2)]);
    }

    #[test]
    fn test_square_around() {
        let cells: Vec<_> = square_around((1, 1), 1).collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], (0, 0));
        assert_eq!(cells[1], (1, 0));
        assert_eq!(cells[3], (0, 1));
        assert_eq!(cells[8], (2, 2));

        let single: Vec<_> = square_around((4, -2), 0).collect();
        assert_eq!(single, vec![(4, -2)]);
    }
}
