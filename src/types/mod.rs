//! Core domain types for defont.
//!
//! This module contains the fundamental types used throughout the compiler:
//! - `GlyphKey` - codepoint or symbolic glyph identifiers
//! - `PixelGrid` - validated source bitmaps
//! - `Rect` / `Outline` - glyph-space geometry
//! - `Glyph` - compiled glyphs with their colour layers
//! - `Colour` / `Palette` - RGBA palettes and the palette generator

mod colour;
mod geometry;
mod glyph;
mod grid;
mod key;
mod palette;

pub use colour::Colour;
pub use geometry::{Bounds, Outline, Rect};
pub use glyph::{Glyph, LayerGlyph};
pub use grid::{CellBox, PixelGrid};
pub use key::{GlyphKey, NOTDEF, SPACE};
pub use palette::{
    Palette, PaletteGenerator, PalettePath, DEFAULT_ALPHA, MAX_PALETTE_SIZE, SEASONAL_ACCENT,
    SEASONAL_MONTH,
};
