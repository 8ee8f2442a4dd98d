//! Font container encoding.
//!
//! The assembler hands a [`FontTables`] description (glyphs in final order,
//! character map, palette, colour layer table) to a [`FontContainer`], which
//! serializes it into one of the supported [`Flavor`]s. Any error here is fatal
//! for the whole build.

mod sfnt;
mod woff;
mod woff2;

pub use sfnt::SfntContainer;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Outline, Palette};

/// Output encodings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Uncompressed TrueType outlines.
    Ttf,
    /// WOFF 1.0, zlib-compressed tables.
    Woff,
    /// WOFF 2.0, one brotli stream over all tables.
    Woff2,
}

impl Flavor {
    pub const ALL: [Flavor; 3] = [Flavor::Ttf, Flavor::Woff, Flavor::Woff2];

    pub fn extension(self) -> &'static str {
        match self {
            Flavor::Ttf => "ttf",
            Flavor::Woff => "woff",
            Flavor::Woff2 => "woff2",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Errors raised while serializing font tables.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("glyph '{0}' appears twice in the glyph order")]
    DuplicateGlyph(String),

    #[error("{context} references unknown glyph '{name}'")]
    UnknownGlyph { name: String, context: &'static str },

    #[error("glyph '{glyph}' uses palette index {index} but the palette has {size} entries")]
    PaletteIndex {
        glyph: String,
        index: u16,
        size: usize,
    },

    #[error("colour layers present but no palette was supplied")]
    MissingPalette,

    #[error("glyph '{glyph}': value {value} does not fit the font's 16-bit coordinates")]
    CoordinateOverflow { glyph: String, value: i64 },

    #[error("{0} glyphs exceed the 65535 glyph limit")]
    TooManyGlyphs(usize),

    #[error("the '{0}' table exceeds its size limit")]
    TableTooLarge(&'static str),

    #[error("codepoint U+{0:04X} is not a Unicode scalar value")]
    InvalidCodepoint(u32),

    #[error("failed to build font tables: {0}")]
    Build(String),

    #[error("failed to write font data: {0}")]
    Io(#[from] std::io::Error),
}

/// Naming and vertical metrics for the whole font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontHeader {
    pub family: String,
    pub style: String,
    pub vendor: String,
    pub vendor_url: Option<String>,
    pub version_major: u16,
    pub version_minor: u16,
    pub units_per_em: u16,
    pub ascent: i16,
    pub descent: i16,
    pub line_gap: i16,
    pub cap_height: i16,
    pub x_height: i16,
    /// Creation time, unix seconds.
    pub created: i64,
}

impl FontHeader {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.family, self.style)
    }

    /// `Family-Style` with everything outside printable ASCII and
    /// `[](){}<>/% ` removed.
    pub fn postscript_name(&self) -> String {
        let clean = |s: &str| -> String {
            s.chars()
                .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
                .collect()
        };
        format!("{}-{}", clean(&self.family), clean(&self.style))
    }

    pub fn version_string(&self) -> String {
        format!("Version {}.{:03}", self.version_major, self.version_minor)
    }

    pub fn is_bold(&self) -> bool {
        self.style.to_ascii_lowercase().contains("bold")
    }

    pub fn is_italic(&self) -> bool {
        let style = self.style.to_ascii_lowercase();
        style.contains("italic") || style.contains("oblique")
    }
}

/// One glyph as it lands in the font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableGlyph {
    pub name: String,
    pub advance_width: i32,
    pub left_side_bearing: i32,
    pub outline: Outline,
}

/// Colour layers of one base glyph, bottom layer first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGlyph {
    pub base: String,
    /// `(layer glyph name, palette index)`.
    pub layers: Vec<(String, u16)>,
}

/// Everything a container needs to write a font.
#[derive(Debug, Clone)]
pub struct FontTables {
    pub header: FontHeader,
    /// Glyphs in final glyph order; index = glyph id.
    pub glyphs: Vec<TableGlyph>,
    /// Codepoint to glyph name.
    pub cmap: BTreeMap<u32, String>,
    pub palette: Option<Palette>,
    pub color_glyphs: Vec<ColorGlyph>,
}

/// Serializes assembled font tables.
pub trait FontContainer {
    fn encode(&self, tables: &FontTables, flavor: Flavor) -> Result<Vec<u8>, ContainerError>;
}
