//! Raster previews.

mod png;

pub use png::{swatch_image, write_swatch};
