//! Final glyph order, character map and font table assembly.

use std::collections::BTreeMap;

use crate::compiler::{verify_metrics, BuildClock, Compilation, MetricsComputer};
use crate::container::{
    ColorGlyph, Flavor, FontContainer, FontHeader, FontTables, TableGlyph,
};
use crate::error::Result;
use crate::types::{Bounds, Glyph, GlyphKey, Outline, Rect, NOTDEF, SPACE};

/// `.notdef` fallback box inset, percent of the em.
const NOTDEF_INSET_PERCENT: i32 = 8;

/// Naming and vertical metrics shared by every glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontInfo {
    pub family: String,
    pub style: String,
    pub vendor: String,
    pub vendor_url: Option<String>,
    pub version_major: u16,
    pub version_minor: u16,
    pub units_per_em: u16,
    pub ascent: i16,
    pub descent: i16,
}

impl Default for FontInfo {
    fn default() -> Self {
        Self {
            family: "defont".to_string(),
            style: "Regular".to_string(),
            vendor: "deidee".to_string(),
            vendor_url: Some("https://deidee.nl/".to_string()),
            version_major: 1,
            version_minor: 0,
            units_per_em: 1000,
            ascent: 900,
            descent: -100,
        }
    }
}

/// One encoded font file.
#[derive(Debug, Clone)]
pub struct EncodedFont {
    pub flavor: Flavor,
    pub bytes: Vec<u8>,
}

/// Orders glyphs, builds the character map and hands the result to a
/// container.
#[derive(Debug, Clone)]
pub struct FontAssembler {
    info: FontInfo,
}

impl FontAssembler {
    pub fn new(info: FontInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &FontInfo {
        &self.info
    }

    /// Lay out the final glyph order:
    ///
    /// 1. `.notdef` (from the table, or an inset box)
    /// 2. `space` (from the table, or an empty one-column glyph)
    /// 3. drawn codepoint glyphs ascending, then named glyphs ascending
    /// 4. every colour layer glyph, grouped under its base in base order
    pub fn assemble(&self, compilation: &Compilation, clock: &BuildClock) -> Result<FontTables> {
        let metrics = MetricsComputer::new(compilation.layout);

        let notdef = compilation
            .glyphs
            .iter()
            .find(|g| g.key.is_notdef())
            .cloned()
            .unwrap_or_else(|| self.default_notdef());
        let space = compilation
            .glyphs
            .iter()
            .find(|g| g.key.is_space())
            .cloned()
            .unwrap_or_else(|| Glyph {
                key: GlyphKey::Codepoint(0x20),
                name: SPACE.to_string(),
                advance_width: metrics.advance_width(1),
                left_side_bearing: 0,
                outline: Outline::new(),
                layers: Vec::new(),
            });

        let mut bases = vec![notdef, space];
        bases.extend(
            compilation
                .glyphs
                .iter()
                .filter(|g| !g.key.is_notdef() && !g.key.is_space())
                .cloned(),
        );

        for glyph in &bases {
            verify_metrics(glyph)?;
        }

        let mut glyphs: Vec<TableGlyph> = bases
            .iter()
            .map(|g| TableGlyph {
                name: g.name.clone(),
                advance_width: g.advance_width,
                left_side_bearing: g.left_side_bearing,
                outline: g.outline.clone(),
            })
            .collect();

        let mut color_glyphs = Vec::new();
        for base in bases.iter().filter(|g| g.has_layers()) {
            for layer in &base.layers {
                glyphs.push(TableGlyph {
                    name: layer.name.clone(),
                    advance_width: base.advance_width,
                    left_side_bearing: layer.left_side_bearing,
                    outline: layer.outline.clone(),
                });
            }
            color_glyphs.push(ColorGlyph {
                base: base.name.clone(),
                layers: base
                    .layer_refs()
                    .map(|(name, index)| (name.to_string(), index))
                    .collect(),
            });
        }

        let palette = if color_glyphs.is_empty() {
            None
        } else {
            Some(compilation.palette.clone())
        };

        Ok(FontTables {
            header: self.header(&bases, clock),
            glyphs,
            cmap: character_map(&bases),
            palette,
            color_glyphs,
        })
    }

    /// Encode every requested flavor. Nothing is returned unless all succeed.
    pub fn emit(
        &self,
        tables: &FontTables,
        flavors: &[Flavor],
        container: &dyn FontContainer,
    ) -> Result<Vec<EncodedFont>> {
        let mut fonts = Vec::with_capacity(flavors.len());
        for &flavor in flavors {
            let bytes = container.encode(tables, flavor)?;
            fonts.push(EncodedFont { flavor, bytes });
        }
        Ok(fonts)
    }

    fn default_notdef(&self) -> Glyph {
        let upm = self.info.units_per_em as i32;
        let inset = upm * NOTDEF_INSET_PERCENT / 100;
        let outline = Rect::new(inset, inset, upm - inset, upm - inset)
            .map(|r| Outline::from_rects(vec![r]))
            .unwrap_or_default();

        Glyph {
            key: GlyphKey::Named(NOTDEF.to_string()),
            name: NOTDEF.to_string(),
            advance_width: upm,
            left_side_bearing: outline.x_min(),
            outline,
            layers: Vec::new(),
        }
    }

    fn header(&self, bases: &[Glyph], clock: &BuildClock) -> FontHeader {
        let info = &self.info;
        let height_of = |cp: u32| {
            bases
                .iter()
                .find(|g| g.key == GlyphKey::Codepoint(cp))
                .and_then(ink_bounds)
                .map(|b| clamp_i16(b.y_max))
        };

        FontHeader {
            family: info.family.clone(),
            style: info.style.clone(),
            vendor: info.vendor.clone(),
            vendor_url: info.vendor_url.clone(),
            version_major: info.version_major,
            version_minor: info.version_minor,
            units_per_em: info.units_per_em,
            ascent: info.ascent,
            descent: info.descent,
            line_gap: 0,
            cap_height: height_of('H' as u32).unwrap_or(info.ascent),
            x_height: height_of('x' as u32).unwrap_or(info.ascent / 2),
            created: clock.timestamp(),
        }
    }
}

/// Codepoint to base glyph name; `space` is always mapped.
pub fn character_map(bases: &[Glyph]) -> BTreeMap<u32, String> {
    let mut cmap: BTreeMap<u32, String> = bases
        .iter()
        .filter_map(|g| g.key.codepoint().map(|cp| (cp, g.name.clone())))
        .collect();
    cmap.insert(0x20, SPACE.to_string());
    cmap
}

/// Bounds of everything a glyph draws, base and layers together.
fn ink_bounds(glyph: &Glyph) -> Option<Bounds> {
    std::iter::once(&glyph.outline)
        .chain(glyph.layers.iter().map(|l| &l.outline))
        .filter_map(Outline::bounds)
        .reduce(Bounds::union)
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{BaseOutline, CompileOptions, Compiler, RenderMode};
    use crate::container::SfntContainer;
    use crate::source::GlyphTable;

    fn column(cols: usize, col: usize) -> Vec<u8> {
        let mut pixels = vec![0u8; 9 * cols];
        for row in 0..9 {
            pixels[row * cols + col] = 1;
        }
        pixels
    }

    fn compile(mode: RenderMode, table: &GlyphTable) -> Compilation {
        let options = CompileOptions {
            seed: 1,
            mode,
            base_outline: BaseOutline::Empty,
            ..CompileOptions::default()
        };
        Compiler::new(options)
            .compile(table, &BuildClock::from_timestamp(0))
            .unwrap()
    }

    fn table() -> GlyphTable {
        [
            (GlyphKey::Named("heart".into()), column(3, 1)),
            (GlyphKey::Codepoint(0x42), column(5, 2)),
            (GlyphKey::Codepoint(0x41), column(5, 2)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_synthesized_notdef_and_space() {
        let compilation = compile(RenderMode::Monochrome, &table());
        let tables = FontAssembler::new(FontInfo::default())
            .assemble(&compilation, &BuildClock::from_timestamp(0))
            .unwrap();

        let notdef = &tables.glyphs[0];
        assert_eq!(notdef.name, ".notdef");
        assert_eq!(notdef.advance_width, 1000);
        assert_eq!(
            notdef.outline.bounds(),
            Some(Bounds {
                x_min: 80,
                y_min: 80,
                x_max: 920,
                y_max: 920,
            })
        );
        assert_eq!(notdef.left_side_bearing, 80);

        let space = &tables.glyphs[1];
        assert_eq!(space.name, "space");
        assert!(space.outline.is_empty());
        assert_eq!(space.advance_width, 3 * 90);
    }

    #[test]
    fn test_monochrome_order_and_no_color() {
        let compilation = compile(RenderMode::Monochrome, &table());
        let tables = FontAssembler::new(FontInfo::default())
            .assemble(&compilation, &BuildClock::from_timestamp(0))
            .unwrap();

        let names: Vec<&str> = tables.glyphs.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec![".notdef", "space", "uni0041", "uni0042", "heart"]);
        assert!(tables.palette.is_none());
        assert!(tables.color_glyphs.is_empty());
    }

    #[test]
    fn test_layers_grouped_after_bases() {
        let compilation = compile(RenderMode::Color, &table());
        let tables = FontAssembler::new(FontInfo::default())
            .assemble(&compilation, &BuildClock::from_timestamp(0))
            .unwrap();

        let names: Vec<&str> = tables.glyphs.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(&names[..5], &[".notdef", "space", "uni0041", "uni0042", "heart"]);

        let layer_bases: Vec<&str> = names[5..]
            .iter()
            .map(|n| n.rsplit_once(".p").unwrap().0)
            .collect();
        let mut grouped = layer_bases.clone();
        grouped.dedup();
        assert_eq!(grouped, vec!["uni0041", "uni0042", "heart"]);

        for glyph in &tables.glyphs[5..] {
            let base = glyph.name.rsplit_once(".p").unwrap().0;
            let base = tables.glyphs.iter().find(|g| g.name == base).unwrap();
            assert_eq!(glyph.advance_width, base.advance_width);
        }
        assert!(tables.palette.is_some());
        assert_eq!(tables.color_glyphs.len(), 3);
    }

    #[test]
    fn test_cmap_covers_codepoints_only() {
        let compilation = compile(RenderMode::Color, &table());
        let tables = FontAssembler::new(FontInfo::default())
            .assemble(&compilation, &BuildClock::from_timestamp(0))
            .unwrap();

        let expected: BTreeMap<u32, String> = BTreeMap::from([
            (0x20, "space".to_string()),
            (0x41, "uni0041".to_string()),
            (0x42, "uni0042".to_string()),
        ]);
        assert_eq!(tables.cmap, expected);
    }

    #[test]
    fn test_emit_all_flavors() {
        let compilation = compile(RenderMode::Color, &table());
        let assembler = FontAssembler::new(FontInfo::default());
        let tables = assembler
            .assemble(&compilation, &BuildClock::from_timestamp(0))
            .unwrap();

        let fonts = assembler
            .emit(&tables, &Flavor::ALL, &SfntContainer)
            .unwrap();
        assert_eq!(fonts.len(), 3);
        assert_eq!(&fonts[0].bytes[0..4], &[0, 1, 0, 0]);
        assert_eq!(&fonts[1].bytes[0..4], b"wOFF");
        assert_eq!(&fonts[2].bytes[0..4], b"wOF2");
    }

    #[test]
    fn test_container_failure_is_fatal() {
        let compilation = compile(RenderMode::Color, &table());
        let assembler = FontAssembler::new(FontInfo::default());
        let mut tables = assembler
            .assemble(&compilation, &BuildClock::from_timestamp(0))
            .unwrap();
        tables.cmap.insert(0x43, "uni0043".to_string());

        assert!(assembler
            .emit(&tables, &Flavor::ALL, &SfntContainer)
            .is_err());
    }
}
