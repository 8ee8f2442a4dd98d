//! Glyph keys and glyph naming.

use std::fmt;

/// Name of the glyph drawn for characters the font does not cover.
pub const NOTDEF: &str = ".notdef";

/// Name of the glyph mapped to U+0020.
pub const SPACE: &str = "space";

/// Identifies one entry of a glyph table: a Unicode codepoint or a
/// symbolic name such as `.notdef`.
///
/// Codepoint keys order before named keys; each group orders ascending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlyphKey {
    Codepoint(u32),
    Named(String),
}

impl GlyphKey {
    /// Parse a key as written in a glyph table: decimal digits become a
    /// codepoint, anything else is a symbolic name.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(cp) = raw.parse::<u32>() {
                return GlyphKey::Codepoint(cp);
            }
        }
        GlyphKey::Named(raw.to_string())
    }

    /// The codepoint, if this is a codepoint key.
    pub fn codepoint(&self) -> Option<u32> {
        match self {
            GlyphKey::Codepoint(cp) => Some(*cp),
            GlyphKey::Named(_) => None,
        }
    }

    pub fn is_notdef(&self) -> bool {
        matches!(self, GlyphKey::Named(name) if name == NOTDEF)
    }

    pub fn is_space(&self) -> bool {
        matches!(self, GlyphKey::Codepoint(0x20))
    }

    /// Production glyph name for this key.
    pub fn glyph_name(&self) -> String {
        match self {
            GlyphKey::Codepoint(0x20) => SPACE.to_string(),
            GlyphKey::Codepoint(cp) if *cp <= 0xFFFF => format!("uni{:04X}", cp),
            GlyphKey::Codepoint(cp) => format!("u{:06X}", cp),
            GlyphKey::Named(name) => name.clone(),
        }
    }

    /// Integer identity fed to colour assignment.
    ///
    /// Codepoints are their own identity; names hash with 32-bit FNV-1a so
    /// the value never depends on table order.
    pub fn identity(&self) -> u32 {
        match self {
            GlyphKey::Codepoint(cp) => *cp,
            GlyphKey::Named(name) => fnv1a(name.as_bytes()),
        }
    }

    /// Key as written in exported data (`"65"`, `".notdef"`).
    pub fn export_key(&self) -> String {
        match self {
            GlyphKey::Codepoint(cp) => cp.to_string(),
            GlyphKey::Named(name) => name.clone(),
        }
    }
}

impl fmt::Display for GlyphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphKey::Codepoint(cp) => write!(f, "U+{:04X}", cp),
            GlyphKey::Named(name) => write!(f, "'{}'", name),
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ b as u32).wrapping_mul(PRIME))
}
