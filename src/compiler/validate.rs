//! Pixel-grid validation.

use crate::types::{GlyphKey, PixelGrid};
use crate::validation::Diagnostic;

/// Checks raw pixel sequences against the table's fixed row count.
#[derive(Debug, Clone, Copy)]
pub struct GlyphValidator {
    rows: usize,
}

/// Outcome of checking one pixel sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCheck {
    /// Usable; an empty sequence reports one column.
    Valid { cols: usize },
    /// Length is not a multiple of the row count.
    Invalid { len: usize },
}

impl GlyphValidator {
    pub fn new(rows: usize) -> Self {
        debug_assert!(rows > 0);
        Self { rows }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn check(&self, pixels: &[u8]) -> GridCheck {
        match pixels.len() {
            0 => GridCheck::Valid { cols: 1 },
            len if len % self.rows == 0 => GridCheck::Valid {
                cols: len / self.rows,
            },
            len => GridCheck::Invalid { len },
        }
    }

    /// Accept a table entry as a `PixelGrid`, or describe why it is skipped.
    pub fn accept(&self, key: &GlyphKey, pixels: &[u8]) -> Result<PixelGrid, Diagnostic> {
        match self.check(pixels) {
            GridCheck::Valid { cols } => Ok(PixelGrid::new(pixels.to_vec(), self.rows, cols)),
            GridCheck::Invalid { len } => Err(Diagnostic::warning(
                "defont::validate::pixel-length",
                format!(
                    "Skipping {}: pixel length {} is not divisible by {}",
                    key, len, self.rows
                ),
            )
            .for_key(key.clone())
            .with_help(format!(
                "Each glyph needs exactly {} rows of equal width",
                self.rows
            ))),
        }
    }
}
