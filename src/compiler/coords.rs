//! Pixel to glyph-space mapping.

use super::RandomStream;
use crate::types::Rect;

/// Pixel size the jitter amount is expressed in; jitter scales by
/// `cell / JITTER_REFERENCE_CELL`.
pub const JITTER_REFERENCE_CELL: i32 = 24;

/// Cell geometry shared by coordinate mapping and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLayout {
    /// Fixed row count of every glyph.
    pub rows: usize,
    /// Design-unit size of one source pixel.
    pub cell: i32,
    /// Padding in whole cells.
    pub left_pad: i32,
    pub right_pad: i32,
    pub bottom_pad: i32,
    /// Extra advance in whole cells.
    pub letterspacing: i32,
}

impl Default for CellLayout {
    fn default() -> Self {
        Self {
            rows: 9,
            cell: 90,
            left_pad: 1,
            right_pad: 1,
            bottom_pad: 0,
            letterspacing: 0,
        }
    }
}

/// Maps `(row, col)` pixels to rectangles in design units.
///
/// Row 0 is the visual top, so rows are inverted into the Y-up design space.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    layout: CellLayout,
    jitter_max: u32,
}

impl CoordinateMapper {
    pub fn new(layout: CellLayout, jitter_max: u32) -> Self {
        Self { layout, jitter_max }
    }

    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    /// Rectangle for one pixel, grown by `extra` units right and up.
    pub fn rect(&self, row: usize, col: usize, extra: i32) -> Rect {
        debug_assert!(row < self.layout.rows);
        let cell = self.layout.cell;
        let x0 = (self.layout.left_pad + col as i32) * cell;
        let y0 = (self.layout.bottom_pad + (self.layout.rows - 1 - row) as i32) * cell;

        Rect {
            x0,
            y0,
            x1: x0 + cell + extra,
            y1: y0 + cell + extra,
        }
    }

    /// Draw one pixel's jitter from the build stream, in design units.
    ///
    /// Consumes nothing from the stream when jitter is disabled.
    pub fn draw_extra(&self, stream: &mut RandomStream) -> i32 {
        if self.jitter_max == 0 {
            return 0;
        }
        let j = stream.range_inclusive(0, self.jitter_max);
        scale_jitter(self.layout.cell, j)
    }

    /// Rectangle for one pixel with jitter drawn from `stream`.
    pub fn map(&self, row: usize, col: usize, stream: &mut RandomStream) -> Rect {
        let extra = self.draw_extra(stream);
        self.rect(row, col, extra)
    }
}

/// `round(cell * j / 24)` in integer arithmetic (half away from zero).
fn scale_jitter(cell: i32, j: u32) -> i32 {
    let num = cell as i64 * j as i64;
    let den = JITTER_REFERENCE_CELL as i64;
    ((num * 2 + den) / (den * 2)) as i32
}
