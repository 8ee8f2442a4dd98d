//! PNG palette swatches.
//!
//! One square per palette entry, left to right in index order, alpha kept.

use std::path::Path;

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::error::{DefontError, Result};
use crate::types::Palette;

/// Render `palette` as a horizontal strip of `cell`-pixel squares.
pub fn swatch_image(palette: &Palette, cell: u32) -> RgbaImage {
    let cell = cell.max(1);
    let width = palette.len() as u32 * cell;

    let mut img: RgbaImage = ImageBuffer::new(width, cell);
    for (i, colour) in palette.iter().enumerate() {
        let rgba = Rgba(colour.to_rgba());
        for sy in 0..cell {
            for sx in 0..cell {
                img.put_pixel(i as u32 * cell + sx, sy, rgba);
            }
        }
    }
    img
}

/// Write a palette swatch strip to a PNG file.
pub fn write_swatch(palette: &Palette, path: &Path, cell: u32) -> Result<()> {
    if palette.is_empty() {
        return Err(DefontError::Build {
            message: "Cannot write a swatch for an empty palette".to_string(),
            help: None,
        });
    }

    swatch_image(palette, cell)
        .save(path)
        .map_err(|e| DefontError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write PNG: {}", e),
        })?;

    Ok(())
}
