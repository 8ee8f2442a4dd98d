//! Compiled glyphs.

use super::{GlyphKey, Outline};

/// One colour layer of a base glyph: the pixels that were assigned a single
/// palette entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerGlyph {
    /// Unique glyph name, `{base}.p{palette_index}`.
    pub name: String,
    pub palette_index: u16,
    pub outline: Outline,
    /// Independently computed from this layer's own outline.
    pub left_side_bearing: i32,
}

impl LayerGlyph {
    /// Layer glyph name for a base glyph and palette entry.
    pub fn name_for(base: &str, palette_index: u16) -> String {
        format!("{}.p{}", base, palette_index)
    }
}

/// A compiled glyph: outline, horizontal metrics and optional colour layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub key: GlyphKey,
    pub name: String,
    pub advance_width: i32,
    pub left_side_bearing: i32,
    pub outline: Outline,
    /// Ascending by palette index; empty for monochrome or undrawn glyphs.
    pub layers: Vec<LayerGlyph>,
}

impl Glyph {
    /// `(layer name, palette index)` pairs in layer order.
    pub fn layer_refs(&self) -> impl Iterator<Item = (&str, u16)> {
        self.layers
            .iter()
            .map(|layer| (layer.name.as_str(), layer.palette_index))
    }

    pub fn has_layers(&self) -> bool {
        !self.layers.is_empty()
    }
}
