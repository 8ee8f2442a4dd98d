//! Validated pixel grids.

use serde::Serialize;

/// A glyph bitmap: row-major 0/1 cells, top row first.
///
/// Grids are built by the validator only, so `pixels.len()` is either 0 or
/// exactly `rows * cols`. An empty grid still reports `cols == 1` so undrawn
/// glyphs get a one-cell advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    pixels: Vec<u8>,
    rows: usize,
    cols: usize,
}

/// Cell-space bounding box of the "on" pixels (`x`, `y` from the top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelGrid {
    pub(crate) fn new(pixels: Vec<u8>, rows: usize, cols: usize) -> Self {
        debug_assert!(pixels.is_empty() || pixels.len() == rows * cols);
        Self { pixels, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True when the source supplied no pixel data at all.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn is_on(&self, index: usize) -> bool {
        self.pixels.get(index) == Some(&1)
    }

    /// Number of "on" pixels.
    pub fn active_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p == 1).count()
    }

    /// "On" pixels in row-major order as `(index, row, col)`.
    pub fn on_pixels(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let cols = self.cols;
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == 1)
            .map(move |(i, _)| (i, i / cols, i % cols))
    }

    /// Nested rows (empty for an empty grid).
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        if self.pixels.is_empty() {
            return Vec::new();
        }
        self.pixels.chunks(self.cols).map(|r| r.to_vec()).collect()
    }

    /// Tight box around the "on" pixels, `None` if nothing is drawn.
    pub fn cell_box(&self) -> Option<CellBox> {
        let mut on = self.on_pixels();
        let (_, first_row, first_col) = on.next()?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) =
            (first_col, first_col, first_row, first_row);

        for (_, row, col) in on {
            x_min = x_min.min(col);
            x_max = x_max.max(col);
            y_min = y_min.min(row);
            y_max = y_max.max(row);
        }

        Some(CellBox {
            x: x_min,
            y: y_min,
            width: x_max - x_min + 1,
            height: y_max - y_min + 1,
        })
    }
}
