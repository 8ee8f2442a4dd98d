//! JSON glyph tables.
//!
//! Accepts either a plain object of pixel arrays
//! (`{"65": [0, 1, ...], ".notdef": [...], "32": null}`) or the document
//! written by `defont data`, whose `glyphs` entries carry a `data` array.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{read_source, GlyphSource, GlyphTable};
use crate::error::{DefontError, Result};
use crate::types::GlyphKey;

#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl GlyphSource for JsonSource {
    fn load(&self) -> Result<GlyphTable> {
        let text = read_source(&self.path)?;
        parse_json_table(&text)
    }

    fn describe(&self) -> String {
        format!("json {}", self.path.display())
    }
}

/// Parse a JSON glyph table, keeping object order.
pub fn parse_json_table(text: &str) -> Result<GlyphTable> {
    let value: Value = serde_json::from_str(text).map_err(|e| DefontError::Parse {
        message: format!("invalid JSON: {}", e),
        help: None,
    })?;
    table_from_value(&value)
}

pub(crate) fn table_from_value(value: &Value) -> Result<GlyphTable> {
    match value {
        Value::Object(map) if is_export(map) => match map.get("glyphs") {
            Some(Value::Object(glyphs)) => from_export(glyphs),
            _ => Err(shape_error("export document has no 'glyphs' object")),
        },
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| pixels_from(k, v).map(|pixels| (GlyphKey::parse(k), pixels)))
            .collect(),
        // A table whose keys happen to be 0..n is encoded as a list.
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                pixels_from(&i.to_string(), v).map(|pixels| (GlyphKey::Codepoint(i as u32), pixels))
            })
            .collect(),
        _ => Err(shape_error("expected a JSON object of glyph pixel arrays")),
    }
}

fn is_export(map: &Map<String, Value>) -> bool {
    map.contains_key("format") && map.contains_key("glyphs")
}

fn from_export(glyphs: &Map<String, Value>) -> Result<GlyphTable> {
    glyphs
        .iter()
        .map(|(k, entry)| {
            let data = entry.get("data").unwrap_or(&Value::Null);
            pixels_from(k, data).map(|pixels| (GlyphKey::parse(k), pixels))
        })
        .collect()
}

fn pixels_from(key: &str, value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|v| u8::try_from(v).ok())
                    .ok_or_else(|| {
                        shape_error(&format!("key {}: pixel value {} is not 0..=255", key, item))
                    })
            })
            .collect(),
        other => Err(shape_error(&format!(
            "key {}: expected an array or null, got {}",
            key, other
        ))),
    }
}

fn shape_error(message: &str) -> DefontError {
    DefontError::Parse {
        message: message.to_string(),
        help: Some("Use {\"65\": [0, 1, ...]} or the output of `defont data`".to_string()),
    }
}
