//! Colour layer decomposition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ColorAssigner, CoordinateMapper, RandomStream};
use crate::types::{GlyphKey, LayerGlyph, Outline, PixelGrid};

/// What the base glyph holds when colour layers are present. One choice per
/// build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseOutline {
    /// Base is empty; only the layers render.
    #[default]
    Empty,
    /// Base repeats every pixel as a monochrome fallback.
    Fallback,
}

/// Whether a build emits colour layers at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Color,
    Monochrome,
}

/// Base outline plus layers of one glyph, before metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decomposition {
    pub base: Outline,
    /// Layer outlines keyed by palette index, ascending.
    pub layers: BTreeMap<u16, Outline>,
}

impl Decomposition {
    /// Name and wrap each layer for `base_name`; side bearings are filled in
    /// by the metrics pass.
    pub fn into_layer_glyphs(self, base_name: &str) -> (Outline, Vec<LayerGlyph>) {
        let layers = self
            .layers
            .into_iter()
            .map(|(palette_index, outline)| LayerGlyph {
                name: LayerGlyph::name_for(base_name, palette_index),
                palette_index,
                outline,
                left_side_bearing: 0,
            })
            .collect();
        (self.base, layers)
    }
}

/// Splits glyph pixels into per-palette-index layer outlines.
#[derive(Debug, Clone, Copy)]
pub struct LayerDecomposer {
    mode: RenderMode,
    base: BaseOutline,
}

impl LayerDecomposer {
    pub fn new(mode: RenderMode, base: BaseOutline) -> Self {
        Self { mode, base }
    }

    /// Walk the "on" pixels in row-major order, drawing one jitter value and
    /// one palette index per pixel.
    ///
    /// Monochrome builds draw the same jitter but assign no colours, so
    /// outlines match the colour build for the same seed.
    pub fn decompose(
        &self,
        key: &GlyphKey,
        grid: &PixelGrid,
        mapper: &CoordinateMapper,
        assigner: &mut ColorAssigner,
        stream: &mut RandomStream,
    ) -> Decomposition {
        let mut out = Decomposition::default();
        let identity = key.identity();

        for (index, row, col) in grid.on_pixels() {
            let rect = mapper.map(row, col, stream);

            match self.mode {
                RenderMode::Monochrome => out.base.push(rect),
                RenderMode::Color => {
                    let palette_index = assigner.assign(identity, index);
                    out.layers.entry(palette_index).or_default().push(rect);
                    if self.base == BaseOutline::Fallback {
                        out.base.push(rect);
                    }
                }
            }
        }

        out
    }
}
