//! Glyph table data export.
//!
//! A JSON snapshot of the source table for tooling: flat and nested pixels,
//! cell bounding boxes and Unicode details, keyed in source order. The same
//! document is accepted back as a glyph source. It can also be wrapped as a
//! Python or JavaScript module for direct import.

use std::fs;
use std::io;
use std::path::Path;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};

use crate::compiler::{BuildClock, GlyphValidator, GridCheck};
use crate::error::{DefontError, Result};
use crate::source::GlyphTable;
use crate::types::{CellBox, GlyphKey, PixelGrid};

pub const DATA_FORMAT: &str = "defont-glyphs";
pub const DATA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct GlyphData {
    pub format: &'static str,
    pub version: u32,
    pub generated_at: String,
    pub source: String,
    pub meta: DataMeta,
    #[serde(serialize_with = "ordered")]
    pub glyphs: Vec<(String, GlyphEntry)>,
}

#[derive(Debug, Serialize)]
pub struct DataMeta {
    pub glyph_count: usize,
    pub keys_in_order: Vec<String>,
    pub distinct_widths: Vec<usize>,
    pub distinct_heights: Vec<usize>,
}

/// Key as it appeared in the source: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExportKey {
    Codepoint(u32),
    Named(String),
}

#[derive(Debug, Serialize)]
pub struct GlyphEntry {
    pub key: ExportKey,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub data: Vec<u8>,
    pub rows: Vec<Vec<u8>>,
    pub active_pixels: usize,
    pub bbox: Option<CellBox>,
    pub codepoint: Option<u32>,
    pub unicode: Option<String>,
    pub char: Option<String>,
}

impl GlyphEntry {
    fn new(key: &GlyphKey, pixels: &[u8], validator: &GlyphValidator) -> Self {
        let grid = match validator.check(pixels) {
            GridCheck::Valid { cols } if !pixels.is_empty() => {
                Some(PixelGrid::new(pixels.to_vec(), validator.rows(), cols))
            }
            _ => None,
        };
        let codepoint = key.codepoint();

        Self {
            key: match key {
                GlyphKey::Codepoint(cp) => ExportKey::Codepoint(*cp),
                GlyphKey::Named(name) => ExportKey::Named(name.clone()),
            },
            width: grid.as_ref().map(PixelGrid::cols),
            height: grid.as_ref().map(PixelGrid::rows),
            data: pixels.to_vec(),
            rows: grid.as_ref().map(PixelGrid::to_rows).unwrap_or_default(),
            active_pixels: pixels.iter().filter(|&&p| p != 0).count(),
            bbox: grid.as_ref().and_then(PixelGrid::cell_box),
            codepoint,
            unicode: codepoint.map(|cp| format!("U+{:04X}", cp)),
            char: codepoint.and_then(char::from_u32).map(String::from),
        }
    }
}

/// Build the export document for `table`.
pub fn export_table(table: &GlyphTable, rows: usize, source: &str, clock: &BuildClock) -> GlyphData {
    let validator = GlyphValidator::new(rows);
    let glyphs: Vec<(String, GlyphEntry)> = table
        .iter()
        .map(|(key, pixels)| (key.export_key(), GlyphEntry::new(key, pixels, &validator)))
        .collect();

    let mut widths: Vec<usize> = glyphs.iter().filter_map(|(_, g)| g.width).collect();
    widths.sort_unstable();
    widths.dedup();
    let mut heights: Vec<usize> = glyphs.iter().filter_map(|(_, g)| g.height).collect();
    heights.sort_unstable();
    heights.dedup();

    GlyphData {
        format: DATA_FORMAT,
        version: DATA_VERSION,
        generated_at: clock.rfc3339(),
        source: source.to_string(),
        meta: DataMeta {
            glyph_count: glyphs.len(),
            keys_in_order: glyphs.iter().map(|(k, _)| k.clone()).collect(),
            distinct_widths: widths,
            distinct_heights: heights,
        },
        glyphs,
    }
}

/// File layouts for an exported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DataFormat {
    /// Plain JSON document
    #[default]
    Json,
    /// Python module assigning `CHARS_DATA`
    #[value(name = "py", alias = "python")]
    Python,
    /// ES module exporting `charsData`
    Js,
}

impl DataFormat {
    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(DataFormat::Json),
            "py" => Some(DataFormat::Python),
            "js" | "mjs" => Some(DataFormat::Js),
            _ => None,
        }
    }
}

pub fn to_json(data: &GlyphData) -> Result<String> {
    let mut json = pretty(data, PrettyFormatter::new())?;
    json.push('\n');
    Ok(json)
}

/// Render `data` in the given file layout.
pub fn render_data(data: &GlyphData, format: DataFormat) -> Result<String> {
    match format {
        DataFormat::Json => to_json(data),
        DataFormat::Python => Ok(format!(
            "# Generated by defont. Do not edit by hand.\n\nCHARS_DATA = {}\n",
            pretty(data, PythonFormatter(PrettyFormatter::new()))?
        )),
        DataFormat::Js => Ok(format!(
            "// Generated by defont. Do not edit by hand.\n\n\
             export const charsData = {};\n\nexport default charsData;\n",
            pretty(data, PrettyFormatter::new())?
        )),
    }
}

pub fn write_data(data: &GlyphData, path: &Path, format: DataFormat) -> Result<()> {
    let text = render_data(data, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DefontError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }
    fs::write(path, text).map_err(|e| DefontError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write glyph data: {}", e),
    })
}

fn pretty<F: Formatter>(data: &GlyphData, formatter: F) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    data.serialize(&mut serializer).map_err(|e| DefontError::Build {
        message: format!("Failed to serialize glyph data: {}", e),
        help: None,
    })?;
    String::from_utf8(out).map_err(|e| DefontError::Build {
        message: format!("Glyph data is not UTF-8: {}", e),
        help: None,
    })
}

/// Pretty JSON with Python's spelling of `null`, `true` and `false`.
struct PythonFormatter(PrettyFormatter<'static>);

impl Formatter for PythonFormatter {
    fn write_null<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"None")
    }

    fn write_bool<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        value: bool,
    ) -> io::Result<()> {
        writer.write_all(if value { b"True" } else { b"False" })
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}

fn ordered<S: Serializer>(entries: &[(String, GlyphEntry)], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, entry) in entries {
        map.serialize_entry(key, entry)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_json_table;

    fn table() -> GlyphTable {
        [
            (GlyphKey::Named(".notdef".into()), vec![1, 1, 1]),
            (GlyphKey::Codepoint(0x41), vec![0, 1, 1, 0, 0, 0]),
            (GlyphKey::Codepoint(0x20), vec![]),
            (GlyphKey::Codepoint(0x42), vec![1, 1]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_entries_in_source_order() {
        let data = export_table(&table(), 3, "chars.php", &BuildClock::from_timestamp(0));
        assert_eq!(data.meta.keys_in_order, vec![".notdef", "65", "32", "66"]);
        assert_eq!(data.meta.distinct_widths, vec![1, 2]);
        assert_eq!(data.meta.distinct_heights, vec![3]);
        assert_eq!(data.generated_at, "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_entry_fields() {
        let data = export_table(&table(), 3, "chars.php", &BuildClock::from_timestamp(0));
        let (_, a) = &data.glyphs[1];
        assert_eq!(a.width, Some(2));
        assert_eq!(a.rows, vec![vec![0, 1], vec![1, 0], vec![0, 0]]);
        assert_eq!(a.active_pixels, 2);
        assert_eq!(
            a.bbox,
            Some(CellBox {
                x: 0,
                y: 0,
                width: 2,
                height: 2,
            })
        );
        assert_eq!(a.char.as_deref(), Some("A"));
        assert_eq!(a.unicode.as_deref(), Some("U+0041"));

        let (_, space) = &data.glyphs[2];
        assert_eq!(space.width, None);
        assert!(space.rows.is_empty());

        let (_, malformed) = &data.glyphs[3];
        assert_eq!(malformed.width, None);
        assert_eq!(malformed.data, vec![1, 1]);
    }

    #[test]
    fn test_json_shape() {
        let data = export_table(&table(), 3, "chars.php", &BuildClock::from_timestamp(0));
        let value: serde_json::Value = serde_json::from_str(&to_json(&data).unwrap()).unwrap();

        assert_eq!(value["format"], "defont-glyphs");
        assert_eq!(value["glyphs"]["65"]["key"], 65);
        assert_eq!(value["glyphs"][".notdef"]["key"], ".notdef");
        assert_eq!(value["glyphs"][".notdef"]["codepoint"], serde_json::Value::Null);
        assert_eq!(value["glyphs"]["32"]["bbox"], serde_json::Value::Null);
    }

    #[test]
    fn test_python_module_uses_python_literals() {
        let data = export_table(&table(), 3, "chars.php", &BuildClock::from_timestamp(0));
        let module = render_data(&data, DataFormat::Python).unwrap();

        assert!(module.starts_with("# Generated by defont"));
        assert!(module.contains("\nCHARS_DATA = {\n  \"format\": \"defont-glyphs\""));
        assert!(module.contains("\"codepoint\": None"));
        assert!(!module.contains("null"));
        assert!(module.ends_with("}\n"));
    }

    #[test]
    fn test_js_module_wraps_json() {
        let data = export_table(&table(), 3, "chars.php", &BuildClock::from_timestamp(0));
        let module = render_data(&data, DataFormat::Js).unwrap();

        let body = module
            .split_once("export const charsData = ")
            .and_then(|(_, rest)| rest.strip_suffix(";\n\nexport default charsData;\n"))
            .unwrap();
        assert_eq!(parse_json_table(body).unwrap(), table());
        assert!(body.contains("\"codepoint\": null"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DataFormat::from_path(Path::new("out/chars.json")), Some(DataFormat::Json));
        assert_eq!(DataFormat::from_path(Path::new("chars_data.py")), Some(DataFormat::Python));
        assert_eq!(DataFormat::from_path(Path::new("chars.MJS")), Some(DataFormat::Js));
        assert_eq!(DataFormat::from_path(Path::new("chars.txt")), None);
        assert_eq!(DataFormat::from_path(Path::new("chars")), None);
    }

    #[test]
    fn test_export_reads_back_as_source() {
        let data = export_table(&table(), 3, "chars.php", &BuildClock::from_timestamp(0));
        let back = parse_json_table(&to_json(&data).unwrap()).unwrap();
        assert_eq!(back, table());
    }
}
