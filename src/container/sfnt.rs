//! TrueType font assembly.
//!
//! Builds simple-glyph `glyf` outlines, the required metric and naming
//! tables, and `COLR`/`CPAL` version 0 when colour layers are present, then
//! lets [`FontBuilder`] lay out the table directory.

use std::collections::HashMap;

use kurbo::BezPath;
use write_fonts::read::FontRef;
use write_fonts::tables::cmap::Cmap;
use write_fonts::tables::colr::{BaseGlyph, Colr, Layer};
use write_fonts::tables::cpal::{ColorRecord, Cpal};
use write_fonts::tables::glyf::{Bbox, Glyf, GlyfLocaBuilder, Glyph, SimpleGlyph};
use write_fonts::tables::head::{Flags, Head, MacStyle};
use write_fonts::tables::hhea::Hhea;
use write_fonts::tables::hmtx::{Hmtx, LongMetric};
use write_fonts::tables::loca::{Loca, LocaFormat};
use write_fonts::tables::maxp::Maxp;
use write_fonts::tables::name::{Name, NameRecord};
use write_fonts::tables::os2::{Os2, SelectionFlags};
use write_fonts::tables::post::Post;
use write_fonts::types::{
    FWord, Fixed, GlyphId, GlyphId16, LongDateTime, NameId, Tag, UfWord, Version16Dot16,
};
use write_fonts::FontBuilder;

use super::{woff, woff2, ContainerError, Flavor, FontContainer, FontTables, TableGlyph};
use crate::types::{Bounds, Palette};

type Result<T> = std::result::Result<T, ContainerError>;

/// Seconds between 1904-01-01 and 1970-01-01.
const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

const PLATFORM_WINDOWS: u16 = 3;
const WINDOWS_BMP: u16 = 1;
const LANGUAGE_EN_US: u16 = 0x0409;

/// head.flags: baseline at y=0, left sidebearing at x=0, integer scaling.
const HEAD_FLAGS: u16 = 0x000B;

/// One table of a finished sfnt, as its directory records it.
#[derive(Debug, Clone)]
pub(super) struct SfntTable {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub data: Vec<u8>,
}

/// Tables of a built font in directory order.
pub(super) fn read_tables(font: &[u8]) -> Result<Vec<SfntTable>> {
    let font = FontRef::new(font).map_err(|e| ContainerError::Build(e.to_string()))?;
    font.table_directory
        .table_records()
        .iter()
        .map(|record| {
            let tag = record.tag();
            let data = font
                .table_data(tag)
                .ok_or_else(|| ContainerError::Build(format!("table '{}' is out of bounds", tag)))?;
            Ok(SfntTable {
                tag: tag.into_bytes(),
                checksum: record.checksum(),
                data: data.as_bytes().to_vec(),
            })
        })
        .collect()
}

/// Writes TrueType fonts and their WOFF wrappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SfntContainer;

impl FontContainer for SfntContainer {
    fn encode(&self, tables: &FontTables, flavor: Flavor) -> Result<Vec<u8>> {
        let sfnt = SfntBuilder::new(tables)?.build()?;
        let (major, minor) = (tables.header.version_major, tables.header.version_minor);

        match flavor {
            Flavor::Ttf => Ok(sfnt),
            Flavor::Woff => woff::encode(&read_tables(&sfnt)?, sfnt.len(), major, minor),
            Flavor::Woff2 => woff2::encode(&read_tables(&sfnt)?, sfnt.len(), major, minor),
        }
    }
}

struct SfntBuilder<'a> {
    tables: &'a FontTables,
    ids: HashMap<&'a str, u16>,
    bounds: Vec<Option<Bounds>>,
}

impl<'a> SfntBuilder<'a> {
    fn new(tables: &'a FontTables) -> Result<Self> {
        if tables.glyphs.len() > u16::MAX as usize {
            return Err(ContainerError::TooManyGlyphs(tables.glyphs.len()));
        }

        let mut ids = HashMap::with_capacity(tables.glyphs.len());
        for (gid, glyph) in tables.glyphs.iter().enumerate() {
            if ids.insert(glyph.name.as_str(), gid as u16).is_some() {
                return Err(ContainerError::DuplicateGlyph(glyph.name.clone()));
            }
        }

        let mut bounds = Vec::with_capacity(tables.glyphs.len());
        for glyph in &tables.glyphs {
            let b = glyph.outline.bounds();
            if let Some(b) = b {
                for v in [b.x_min, b.y_min, b.x_max, b.y_max] {
                    coord(&glyph.name, v)?;
                }
            }
            advance(glyph)?;
            coord(&glyph.name, glyph.left_side_bearing)?;
            bounds.push(b);
        }

        Ok(Self {
            tables,
            ids,
            bounds,
        })
    }

    fn id(&self, name: &str, context: &'static str) -> Result<u16> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| ContainerError::UnknownGlyph {
                name: name.to_string(),
                context,
            })
    }

    fn drawn(&self) -> impl Iterator<Item = (&TableGlyph, Bounds)> {
        self.tables
            .glyphs
            .iter()
            .zip(&self.bounds)
            .filter_map(|(g, b)| b.map(|b| (g, b)))
    }

    fn font_bounds(&self) -> Bounds {
        self.bounds
            .iter()
            .flatten()
            .copied()
            .reduce(Bounds::union)
            .unwrap_or(Bounds {
                x_min: 0,
                y_min: 0,
                x_max: 0,
                y_max: 0,
            })
    }

    fn build(&self) -> Result<Vec<u8>> {
        let (glyf, loca, loca_format) = self.glyf_loca()?;

        let mut font = FontBuilder::new();
        font.add_table(&glyf).map_err(build_error)?;
        font.add_table(&loca).map_err(build_error)?;
        font.add_table(&self.head(loca_format)).map_err(build_error)?;
        font.add_table(&self.hhea()?).map_err(build_error)?;
        font.add_table(&self.hmtx()?).map_err(build_error)?;
        font.add_table(&self.maxp()).map_err(build_error)?;
        font.add_table(&self.cmap()?).map_err(build_error)?;
        font.add_table(&self.name()).map_err(build_error)?;
        font.add_table(&self.os2()?).map_err(build_error)?;
        font.add_table(&self.post()).map_err(build_error)?;

        if !self.tables.color_glyphs.is_empty() {
            let palette = self
                .tables
                .palette
                .as_ref()
                .ok_or(ContainerError::MissingPalette)?;
            font.add_table(&self.colr(palette)?).map_err(build_error)?;
            font.add_table(&cpal(palette)?).map_err(build_error)?;
        }

        Ok(font.build())
    }

    fn glyf_loca(&self) -> Result<(Glyf, Loca, LocaFormat)> {
        let mut builder = GlyfLocaBuilder::new();
        for (glyph, bounds) in self.tables.glyphs.iter().zip(&self.bounds) {
            let glyph = match bounds {
                Some(bounds) => Glyph::Simple(simple_glyph(glyph, bounds)?),
                None => Glyph::Empty,
            };
            builder.add_glyph(&glyph).map_err(build_error)?;
        }
        Ok(builder.build())
    }

    fn head(&self, loca_format: LocaFormat) -> Head {
        let header = &self.tables.header;
        let b = self.font_bounds();
        let revision = header.version_major as f64 + header.version_minor as f64 / 1000.0;
        let timestamp = LongDateTime::new(header.created + MAC_EPOCH_OFFSET);

        let mac_style = match (header.is_bold(), header.is_italic()) {
            (false, false) => MacStyle::empty(),
            (true, false) => MacStyle::BOLD,
            (false, true) => MacStyle::ITALIC,
            (true, true) => MacStyle::BOLD | MacStyle::ITALIC,
        };

        // bounds were range-checked in new()
        Head {
            font_revision: Fixed::from_f64(revision),
            checksum_adjustment: 0,
            flags: Flags::from_bits_truncate(HEAD_FLAGS),
            units_per_em: header.units_per_em,
            created: timestamp,
            modified: timestamp,
            x_min: b.x_min as i16,
            y_min: b.y_min as i16,
            x_max: b.x_max as i16,
            y_max: b.y_max as i16,
            mac_style,
            lowest_rec_ppem: 8,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
            ..Default::default()
        }
    }

    fn hhea(&self) -> Result<Hhea> {
        let header = &self.tables.header;
        let advance_max = self
            .tables
            .glyphs
            .iter()
            .map(|g| g.advance_width)
            .max()
            .unwrap_or(0);

        let mut min_lsb = i32::MAX;
        let mut min_rsb = i32::MAX;
        let mut max_extent = i32::MIN;
        for (glyph, b) in self.drawn() {
            let extent = glyph.left_side_bearing + (b.x_max - b.x_min);
            min_lsb = min_lsb.min(glyph.left_side_bearing);
            min_rsb = min_rsb.min(glyph.advance_width - extent);
            max_extent = max_extent.max(extent);
        }
        if max_extent == i32::MIN {
            (min_lsb, min_rsb, max_extent) = (0, 0, 0);
        }

        Ok(Hhea {
            ascender: FWord::new(header.ascent),
            descender: FWord::new(header.descent),
            line_gap: FWord::new(header.line_gap),
            advance_width_max: UfWord::new(advance_max as u16),
            min_left_side_bearing: FWord::new(coord("hhea", min_lsb)?),
            min_right_side_bearing: FWord::new(coord("hhea", min_rsb)?),
            x_max_extent: FWord::new(coord("hhea", max_extent)?),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: self.tables.glyphs.len() as u16,
        })
    }

    fn hmtx(&self) -> Result<Hmtx> {
        let metrics = self
            .tables
            .glyphs
            .iter()
            .map(|glyph| {
                Ok(LongMetric::new(
                    advance(glyph)?,
                    coord(&glyph.name, glyph.left_side_bearing)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Hmtx::new(metrics, Vec::new()))
    }

    fn maxp(&self) -> Maxp {
        let max_points = self
            .tables
            .glyphs
            .iter()
            .map(|g| g.outline.point_count())
            .max()
            .unwrap_or(0);
        let max_contours = self
            .tables
            .glyphs
            .iter()
            .map(|g| g.outline.contour_count())
            .max()
            .unwrap_or(0);

        Maxp {
            num_glyphs: self.tables.glyphs.len() as u16,
            max_points: Some(max_points.min(u16::MAX as usize) as u16),
            max_contours: Some(max_contours.min(u16::MAX as usize) as u16),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(2),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        }
    }

    /// Format 4 for the BMP, plus format 12 when astral codepoints exist.
    fn cmap(&self) -> Result<Cmap> {
        let mut mappings = Vec::with_capacity(self.tables.cmap.len());
        for (&cp, name) in &self.tables.cmap {
            let ch = char::from_u32(cp).ok_or(ContainerError::InvalidCodepoint(cp))?;
            mappings.push((ch, GlyphId::new(self.id(name, "cmap")? as u32)));
        }
        Cmap::from_mappings(mappings).map_err(|e| ContainerError::Build(format!("cmap: {:?}", e)))
    }

    fn name(&self) -> Name {
        let header = &self.tables.header;
        let postscript = header.postscript_name();
        let mut records: Vec<(u16, String)> = vec![
            (1, header.family.clone()),
            (2, header.style.clone()),
            (3, format!("{};{};{}", header.version_string(), header.vendor, postscript)),
            (4, header.full_name()),
            (5, header.version_string()),
            (6, postscript),
            (8, header.vendor.clone()),
            (9, header.vendor.clone()),
        ];
        if let Some(url) = &header.vendor_url {
            records.push((11, url.clone()));
        }

        Name::new(
            records
                .into_iter()
                .map(|(id, text)| {
                    NameRecord::new(
                        PLATFORM_WINDOWS,
                        WINDOWS_BMP,
                        LANGUAGE_EN_US,
                        NameId::new(id),
                        text.into(),
                    )
                })
                .collect(),
        )
    }

    fn os2(&self) -> Result<Os2> {
        let header = &self.tables.header;
        let upm = header.units_per_em as i32;
        let scaled = |percent: i32| (upm * percent / 100) as i16;
        let b = self.font_bounds();

        let advances: Vec<i32> = self
            .tables
            .glyphs
            .iter()
            .map(|g| g.advance_width)
            .filter(|&a| a > 0)
            .collect();
        let avg_width = if advances.is_empty() {
            0
        } else {
            let sum: i64 = advances.iter().map(|&a| a as i64).sum();
            (sum + advances.len() as i64 / 2) / advances.len() as i64
        };

        let (weight, selection) = match (header.is_bold(), header.is_italic()) {
            (false, false) => (400, SelectionFlags::REGULAR),
            (true, false) => (700, SelectionFlags::BOLD),
            (false, true) => (400, SelectionFlags::ITALIC),
            (true, true) => (700, SelectionFlags::BOLD | SelectionFlags::ITALIC),
        };

        let mut codepoints = self.tables.cmap.keys().copied();
        let first = codepoints.next().unwrap_or(0);
        let last = codepoints.last().unwrap_or(first);
        let ranges = unicode_ranges(self.tables.cmap.keys().copied());

        Ok(Os2 {
            x_avg_char_width: coord("OS/2", avg_width as i32)?,
            us_weight_class: weight,
            us_width_class: 5,
            fs_type: 0,
            y_subscript_x_size: scaled(65),
            y_subscript_y_size: scaled(60),
            y_subscript_x_offset: 0,
            y_subscript_y_offset: scaled(7),
            y_superscript_x_size: scaled(65),
            y_superscript_y_size: scaled(60),
            y_superscript_x_offset: 0,
            y_superscript_y_offset: scaled(35),
            y_strikeout_size: scaled(5),
            y_strikeout_position: scaled(25),
            ul_unicode_range_1: ranges[0],
            ul_unicode_range_2: ranges[1],
            ul_unicode_range_3: ranges[2],
            ul_unicode_range_4: ranges[3],
            ach_vend_id: Tag::new(&vendor_tag(&header.vendor)),
            fs_selection: selection | SelectionFlags::USE_TYPO_METRICS,
            us_first_char_index: first.min(0xFFFF) as u16,
            us_last_char_index: last.min(0xFFFF) as u16,
            s_typo_ascender: header.ascent,
            s_typo_descender: header.descent,
            s_typo_line_gap: header.line_gap,
            us_win_ascent: (header.ascent as i32).max(b.y_max).max(0) as u16,
            us_win_descent: (-(header.descent as i32)).max(-b.y_min).max(0) as u16,
            ul_code_page_range_1: Some(1),
            ul_code_page_range_2: Some(0),
            sx_height: Some(header.x_height),
            s_cap_height: Some(header.cap_height),
            us_default_char: Some(0),
            us_break_char: Some(0x20),
            us_max_context: Some(0),
            ..Default::default()
        })
    }

    fn post(&self) -> Post {
        let upm = self.tables.header.units_per_em as i32;
        let mut advances = self.drawn().map(|(g, _)| g.advance_width);
        let fixed_pitch = match advances.next() {
            Some(first) => advances.all(|a| a == first),
            None => false,
        };

        Post {
            version: Version16Dot16::VERSION_3_0,
            underline_position: FWord::new((-upm / 10) as i16),
            underline_thickness: FWord::new((upm / 20).max(1) as i16),
            is_fixed_pitch: fixed_pitch as u32,
            ..Default::default()
        }
    }

    fn colr(&self, palette: &Palette) -> Result<Colr> {
        let mut bases = Vec::with_capacity(self.tables.color_glyphs.len());
        for color in &self.tables.color_glyphs {
            bases.push((self.id(&color.base, "COLR")?, color));
        }
        bases.sort_by_key(|(gid, _)| *gid);

        let mut base_records = Vec::with_capacity(bases.len());
        let mut layer_records = Vec::new();
        for (gid, color) in bases {
            let first = layer_records.len();
            for (layer, index) in &color.layers {
                if *index as usize >= palette.len() {
                    return Err(ContainerError::PaletteIndex {
                        glyph: layer.clone(),
                        index: *index,
                        size: palette.len(),
                    });
                }
                layer_records.push(Layer::new(
                    GlyphId16::new(self.id(layer, "COLR layer")?),
                    *index,
                ));
            }
            if layer_records.len() > u16::MAX as usize {
                return Err(ContainerError::TableTooLarge("COLR"));
            }
            base_records.push(BaseGlyph::new(
                GlyphId16::new(gid),
                first as u16,
                (layer_records.len() - first) as u16,
            ));
        }

        let (num_bases, num_layers) = (base_records.len() as u16, layer_records.len() as u16);
        Ok(Colr::new(
            num_bases,
            Some(base_records),
            Some(layer_records),
            num_layers,
        ))
    }
}

fn cpal(palette: &Palette) -> Result<Cpal> {
    if palette.len() > u16::MAX as usize {
        return Err(ContainerError::TableTooLarge("CPAL"));
    }
    let entries = palette.len() as u16;
    let records = palette
        .iter()
        .map(|colour| {
            let [blue, green, red, alpha] = colour.to_bgra();
            ColorRecord::new(blue, green, red, alpha)
        })
        .collect();

    Ok(Cpal::new(entries, 1, entries, Some(records), vec![0]))
}

/// One closed contour per rect, each clockwise from its bottom-left corner.
fn simple_glyph(glyph: &TableGlyph, b: &Bounds) -> Result<SimpleGlyph> {
    let rects = glyph.outline.rects();
    if rects.len() > i16::MAX as usize {
        return Err(ContainerError::TableTooLarge("glyf"));
    }

    let mut path = BezPath::new();
    for rect in rects {
        let [start, rest @ ..] = rect.contour();
        path.move_to((start.0 as f64, start.1 as f64));
        for (x, y) in rest {
            path.line_to((x as f64, y as f64));
        }
        path.close_path();
    }

    let mut simple = SimpleGlyph::from_bezpath(&path)
        .map_err(|e| ContainerError::Build(format!("glyph '{}': {:?}", glyph.name, e)))?;
    simple.bbox = Bbox {
        x_min: coord(&glyph.name, b.x_min)?,
        y_min: coord(&glyph.name, b.y_min)?,
        x_max: coord(&glyph.name, b.x_max)?,
        y_max: coord(&glyph.name, b.y_max)?,
    };
    Ok(simple)
}

fn build_error(err: impl std::fmt::Display) -> ContainerError {
    ContainerError::Build(err.to_string())
}

/// OS/2 ulUnicodeRange bits for the blocks this compiler reports.
fn unicode_ranges(codepoints: impl Iterator<Item = u32>) -> [u32; 4] {
    let mut ranges = [0u32; 4];
    let mut set = |bit: usize| ranges[bit / 32] |= 1 << (bit % 32);
    for cp in codepoints {
        match cp {
            0x0000..=0x007F => set(0),
            0x0080..=0x00FF => set(1),
            0x0100..=0x017F => set(2),
            0x0180..=0x024F => set(3),
            0x1_0000.. => set(57),
            _ => {}
        }
    }
    ranges
}

fn vendor_tag(vendor: &str) -> [u8; 4] {
    let mut tag = [b' '; 4];
    for (slot, b) in tag
        .iter_mut()
        .zip(vendor.bytes().filter(|b| b.is_ascii_graphic()))
    {
        *slot = b;
    }
    tag
}

fn coord(glyph: &str, value: i32) -> Result<i16> {
    i16::try_from(value).map_err(|_| ContainerError::CoordinateOverflow {
        glyph: glyph.to_string(),
        value: value as i64,
    })
}

fn advance(glyph: &TableGlyph) -> Result<u16> {
    u16::try_from(glyph.advance_width).map_err(|_| ContainerError::CoordinateOverflow {
        glyph: glyph.name.clone(),
        value: glyph.advance_width as i64,
    })
}

#[cfg(test)]
pub(super) mod tests {
    use std::collections::BTreeMap;

    use write_fonts::read::TableProvider;

    use super::*;
    use crate::container::{ColorGlyph, FontHeader};
    use crate::types::{Colour, Outline, Rect};

    pub fn header() -> FontHeader {
        FontHeader {
            family: "Test Font".to_string(),
            style: "Regular".to_string(),
            vendor: "deidee".to_string(),
            vendor_url: None,
            version_major: 1,
            version_minor: 0,
            units_per_em: 1000,
            ascent: 900,
            descent: -100,
            line_gap: 0,
            cap_height: 700,
            x_height: 500,
            created: 0,
        }
    }

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Rect {
        Rect::new(x0, y0, x1, y1).unwrap()
    }

    fn glyph(name: &str, advance: i32, rects: Vec<Rect>) -> TableGlyph {
        let outline = Outline::from_rects(rects);
        TableGlyph {
            name: name.to_string(),
            advance_width: advance,
            left_side_bearing: outline.x_min(),
            outline,
        }
    }

    pub fn sample_tables(color: bool) -> FontTables {
        let mut glyphs = vec![
            glyph(".notdef", 1000, vec![rect(80, 0, 920, 900)]),
            glyph("space", 270, vec![]),
            glyph("uni0041", 450, vec![rect(90, 0, 180, 90), rect(180, 90, 270, 180)]),
        ];
        let mut color_glyphs = Vec::new();
        if color {
            glyphs.push(glyph("uni0041.p0", 450, vec![rect(90, 0, 180, 90)]));
            glyphs.push(glyph("uni0041.p2", 450, vec![rect(180, 90, 270, 180)]));
            color_glyphs.push(ColorGlyph {
                base: "uni0041".to_string(),
                layers: vec![("uni0041.p0".to_string(), 0), ("uni0041.p2".to_string(), 2)],
            });
        }

        FontTables {
            header: header(),
            glyphs,
            cmap: BTreeMap::from([(0x20, "space".to_string()), (0x41, "uni0041".to_string())]),
            palette: Some(Palette::new(vec![
                Colour::new(10, 200, 30, 128),
                Colour::new(20, 210, 40, 128),
                Colour::new(30, 220, 50, 128),
            ])),
            color_glyphs,
        }
    }

    /// Table data by tag from an sfnt.
    pub fn find_table<'a>(font: &'a [u8], tag: &[u8; 4]) -> Option<&'a [u8]> {
        FontRef::new(font)
            .unwrap()
            .table_data(Tag::new(tag))
            .map(|data| data.as_bytes())
    }

    fn be_u16(data: &[u8], at: usize) -> u16 {
        u16::from_be_bytes([data[at], data[at + 1]])
    }

    fn be_u32(data: &[u8], at: usize) -> u32 {
        u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
    }

    /// Raw `glyf` record of a glyph id, following `head.indexToLocFormat`.
    fn glyph_record<'a>(font: &'a [u8], gid: usize) -> &'a [u8] {
        let head = find_table(font, b"head").unwrap();
        let loca = find_table(font, b"loca").unwrap();
        let glyf = find_table(font, b"glyf").unwrap();
        let (start, end) = if be_u16(head, 50) == 0 {
            (be_u16(loca, gid * 2) as usize * 2, be_u16(loca, gid * 2 + 2) as usize * 2)
        } else {
            (be_u32(loca, gid * 4) as usize, be_u32(loca, gid * 4 + 4) as usize)
        };
        &glyf[start..end]
    }

    #[test]
    fn test_directory_sorted_and_aligned() {
        let font = SfntContainer.encode(&sample_tables(true), Flavor::Ttf).unwrap();
        assert_eq!(be_u32(&font, 0), 0x0001_0000);

        let tables = read_tables(&font).unwrap();
        assert_eq!(tables.len(), 12);
        let tags: Vec<[u8; 4]> = tables.iter().map(|t| t.tag).collect();
        let mut sorted = tags.clone();
        sorted.sort();
        assert_eq!(tags, sorted);

        for i in 0..tables.len() {
            assert_eq!(be_u32(&font, 12 + i * 16 + 8) % 4, 0);
        }
    }

    #[test]
    fn test_monochrome_has_no_color_tables() {
        let font = SfntContainer.encode(&sample_tables(false), Flavor::Ttf).unwrap();
        assert!(find_table(&font, b"COLR").is_none());
        assert!(find_table(&font, b"CPAL").is_none());
        assert_eq!(be_u16(&font, 4), 10);
    }

    #[test]
    fn test_metric_tables() {
        let font = SfntContainer.encode(&sample_tables(true), Flavor::Ttf).unwrap();
        let parsed = FontRef::new(&font).unwrap();

        let head = parsed.head().unwrap();
        assert_eq!(head.units_per_em(), 1000);
        assert_eq!(head.x_min(), 80);
        assert_eq!(head.y_max(), 900);

        assert_eq!(parsed.maxp().unwrap().num_glyphs(), 5);
        assert_eq!(parsed.hhea().unwrap().number_of_long_metrics(), 5);
        assert_eq!(find_table(&font, b"hmtx").unwrap().len(), 5 * 4);
        assert_eq!(find_table(&font, b"OS/2").unwrap().len(), 96);
        assert_eq!(find_table(&font, b"post").unwrap().len(), 32);
        assert_eq!(be_u32(find_table(&font, b"post").unwrap(), 0), 0x0003_0000);

        let loca_unit = if be_u16(find_table(&font, b"head").unwrap(), 50) == 0 { 2 } else { 4 };
        assert_eq!(find_table(&font, b"loca").unwrap().len(), 6 * loca_unit);
    }

    #[test]
    fn test_os2_vendor_and_char_range() {
        let font = SfntContainer.encode(&sample_tables(false), Flavor::Ttf).unwrap();
        let os2 = find_table(&font, b"OS/2").unwrap();
        assert_eq!(&os2[58..62], b"deid");
        assert_eq!(be_u16(os2, 64), 0x20);
        assert_eq!(be_u16(os2, 66), 0x41);
    }

    #[test]
    fn test_cmap_maps_codepoints_to_gids() {
        let font = SfntContainer.encode(&sample_tables(true), Flavor::Ttf).unwrap();
        let cmap = FontRef::new(&font).unwrap().cmap().unwrap();
        assert_eq!(cmap.map_codepoint(0x20u32), Some(GlyphId::new(1)));
        assert_eq!(cmap.map_codepoint(0x41u32), Some(GlyphId::new(2)));
        assert_eq!(cmap.map_codepoint(0x42u32), None);
    }

    #[test]
    fn test_astral_codepoint_is_mapped() {
        let mut tables = sample_tables(false);
        tables.glyphs.push(glyph("u01F600", 450, vec![rect(90, 0, 180, 90)]));
        tables.cmap.insert(0x1F600, "u01F600".to_string());

        let font = SfntContainer.encode(&tables, Flavor::Ttf).unwrap();
        let cmap = FontRef::new(&font).unwrap().cmap().unwrap();
        assert_eq!(cmap.map_codepoint(0x1F600u32), Some(GlyphId::new(3)));
        assert_eq!(cmap.map_codepoint(0x41u32), Some(GlyphId::new(2)));
    }

    #[test]
    fn test_simple_glyph_encoding() {
        let font = SfntContainer.encode(&sample_tables(false), Flavor::Ttf).unwrap();

        assert!(glyph_record(&font, 1).is_empty());

        let record = glyph_record(&font, 2);
        assert_eq!(be_u16(record, 0), 2);
        assert_eq!(be_u16(record, 2), 90);
        assert_eq!(be_u16(record, 4), 0);
        assert_eq!(be_u16(record, 6), 270);
        assert_eq!(be_u16(record, 8), 180);
        // four on-curve points per rect
        assert_eq!(be_u16(record, 10), 3);
        assert_eq!(be_u16(record, 12), 7);
    }

    #[test]
    fn test_colr_and_cpal() {
        let font = SfntContainer.encode(&sample_tables(true), Flavor::Ttf).unwrap();
        let colr = find_table(&font, b"COLR").unwrap();
        assert_eq!(be_u16(colr, 2), 1);
        assert_eq!(be_u16(colr, 12), 2);
        // base record: gid 2, first layer 0, two layers
        let bases = be_u32(colr, 4) as usize;
        assert_eq!(&colr[bases..bases + 6], &[0, 2, 0, 0, 0, 2]);
        // layer records: gid 3 / index 0, gid 4 / index 2
        let layers = be_u32(colr, 8) as usize;
        assert_eq!(&colr[layers..layers + 8], &[0, 3, 0, 0, 0, 4, 0, 2]);

        let cpal = find_table(&font, b"CPAL").unwrap();
        assert_eq!(be_u16(cpal, 2), 3);
        let records = be_u32(cpal, 8) as usize;
        assert_eq!(&cpal[records..records + 4], &[30, 200, 10, 128]);
    }

    #[test]
    fn test_name_table_is_utf16() {
        let font = SfntContainer.encode(&sample_tables(false), Flavor::Ttf).unwrap();
        let name = find_table(&font, b"name").unwrap();
        let count = be_u16(name, 2) as usize;
        let storage = be_u16(name, 4) as usize;
        let family = (0..count)
            .map(|i| &name[6 + i * 12..18 + i * 12])
            .find(|record| be_u16(record, 6) == 1)
            .unwrap();
        assert_eq!(be_u16(family, 0), PLATFORM_WINDOWS);
        let len = be_u16(family, 8) as usize;
        let offset = be_u16(family, 10) as usize;
        let units: Vec<u16> = name[storage + offset..storage + offset + len]
            .chunks(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        assert_eq!(String::from_utf16(&units).unwrap(), "Test Font");
        assert_eq!(count, 8);
    }

    #[test]
    fn test_vendor_url_adds_name_record() {
        let mut tables = sample_tables(false);
        tables.header.vendor_url = Some("https://deidee.nl/".to_string());
        let font = SfntContainer.encode(&tables, Flavor::Ttf).unwrap();
        let name = find_table(&font, b"name").unwrap();
        assert_eq!(be_u16(name, 2), 9);
    }

    #[test]
    fn test_unknown_cmap_glyph() {
        let mut tables = sample_tables(false);
        tables.cmap.insert(0x42, "uni0042".to_string());
        assert!(matches!(
            SfntContainer.encode(&tables, Flavor::Ttf),
            Err(ContainerError::UnknownGlyph { .. })
        ));
    }

    #[test]
    fn test_surrogate_codepoint_rejected() {
        let mut tables = sample_tables(false);
        tables.cmap.insert(0xD800, "space".to_string());
        assert!(matches!(
            SfntContainer.encode(&tables, Flavor::Ttf),
            Err(ContainerError::InvalidCodepoint(0xD800))
        ));
    }

    #[test]
    fn test_palette_index_out_of_range() {
        let mut tables = sample_tables(true);
        tables.color_glyphs[0].layers[1].1 = 7;
        assert!(matches!(
            SfntContainer.encode(&tables, Flavor::Ttf),
            Err(ContainerError::PaletteIndex { index: 7, .. })
        ));
    }

    #[test]
    fn test_missing_palette() {
        let mut tables = sample_tables(true);
        tables.palette = None;
        assert!(matches!(
            SfntContainer.encode(&tables, Flavor::Ttf),
            Err(ContainerError::MissingPalette)
        ));
    }

    #[test]
    fn test_coordinate_overflow() {
        let mut tables = sample_tables(false);
        tables.glyphs.push(glyph("big", 450, vec![rect(0, 0, 40_000, 10)]));
        assert!(matches!(
            SfntContainer.encode(&tables, Flavor::Ttf),
            Err(ContainerError::CoordinateOverflow { .. })
        ));
    }

    #[test]
    fn test_duplicate_glyph() {
        let mut tables = sample_tables(false);
        tables.glyphs.push(glyph("space", 270, vec![]));
        assert!(matches!(
            SfntContainer.encode(&tables, Flavor::Ttf),
            Err(ContainerError::DuplicateGlyph(_))
        ));
    }

    #[test]
    fn test_vendor_tag() {
        assert_eq!(&vendor_tag("deidee"), b"deid");
        assert_eq!(&vendor_tag("ab"), b"ab  ");
    }
}
