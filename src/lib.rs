//! defont - Bitmap glyph table to colour font compiler
//!
//! A library for turning hand-drawn pixel glyph tables into TrueType, WOFF
//! and WOFF2 fonts with COLR/CPAL colour layers.

pub mod assemble;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod container;
pub mod error;
pub mod export;
pub mod output;
pub mod render;
pub mod source;
pub mod types;
pub mod validation;

pub use assemble::{character_map, EncodedFont, FontAssembler, FontInfo};
pub use compiler::{
    AssignmentMode, BaseOutline, BuildClock, CellLayout, Compilation, CompileOptions, Compiler,
    RenderMode,
};
pub use config::Config;
pub use container::{ContainerError, Flavor, FontContainer, FontTables, SfntContainer};
pub use error::{DefontError, Result};
pub use export::{build_manifest, export_table, GlyphData, Manifest};
pub use render::write_swatch;
pub use source::{open_source, GlyphSource, GlyphTable, JsonSource, PhpArraySource, PhpProcessSource};
pub use types::{Colour, Glyph, GlyphKey, Outline, Palette, PixelGrid, Rect};
pub use validation::{Diagnostic, Severity, ValidationResult};
