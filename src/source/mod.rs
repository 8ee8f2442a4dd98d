//! Glyph table sources.
//!
//! A glyph table is an ordered map from [`GlyphKey`] to a flat row-major pixel
//! sequence. Three adapters produce one:
//!
//! - [`PhpArraySource`] reads `$c[0x41] = array(...);` assignments as text
//! - [`JsonSource`] reads a plain JSON object or a `defont data` export
//! - [`PhpProcessSource`] asks the PHP interpreter to `json_encode` the table
//!
//! Sources perform no pixel validation; that happens in the compiler.

mod json;
mod php;
mod process;

pub use json::{parse_json_table, JsonSource};
pub use php::{parse_php_table, PhpArraySource};
pub use process::PhpProcessSource;

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::types::GlyphKey;

/// Anything that can produce a glyph table.
pub trait GlyphSource {
    fn load(&self) -> Result<GlyphTable>;

    /// Short label used in status output and exports.
    fn describe(&self) -> String;
}

/// Ordered glyph table in source assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphTable {
    entries: Vec<(GlyphKey, Vec<u8>)>,
    /// Position of each key in `entries`.
    slots: HashMap<GlyphKey, usize>,
}

impl GlyphTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A repeated key replaces the earlier pixels but keeps
    /// its original position. Returns true on replacement.
    pub fn insert(&mut self, key: GlyphKey, pixels: Vec<u8>) -> bool {
        if let Some(&slot) = self.slots.get(&key) {
            self.entries[slot].1 = pixels;
            return true;
        }
        self.slots.insert(key.clone(), self.entries.len());
        self.entries.push((key, pixels));
        false
    }

    pub fn get(&self, key: &GlyphKey) -> Option<&[u8]> {
        self.slots
            .get(key)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GlyphKey, &[u8])> {
        self.entries.iter().map(|(k, p)| (k, p.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &GlyphKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(GlyphKey, Vec<u8>)> for GlyphTable {
    fn from_iter<I: IntoIterator<Item = (GlyphKey, Vec<u8>)>>(iter: I) -> Self {
        let mut table = GlyphTable::new();
        for (key, pixels) in iter {
            table.insert(key, pixels);
        }
        table
    }
}

/// Pick an adapter by file extension. `.php` files are parsed as text unless
/// `use_interpreter` is set.
pub fn open_source(path: &Path, use_interpreter: bool) -> Box<dyn GlyphSource> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Box::new(JsonSource::new(path))
    } else if use_interpreter {
        Box::new(PhpProcessSource::new(path))
    } else {
        Box::new(PhpArraySource::new(path))
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| crate::error::DefontError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
