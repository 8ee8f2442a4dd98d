//! Font manifest: a JSON summary of the files a build wrote, their naming and
//! their Unicode coverage.
//!
//! Built from the assembled tables rather than by re-reading the fonts.

use std::fs;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::compiler::BuildClock;
use crate::container::{Flavor, FontTables};
use crate::error::{DefontError, Result};

pub const MANIFEST_VERSION: u32 = 1;

const BMP_MAX: u32 = 0xFFFF;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub name: String,
    pub metadata: ManifestMetadata,
    pub files: Vec<ManifestFile>,
    pub unicode_ranges: Vec<[u32; 2]>,
    pub counts: CodepointCounts,
    pub features: FeatureTags,
    pub hints: ManifestHints,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    pub family: String,
    pub subfamily: String,
    pub full_name: String,
    pub post_script_name: String,
    pub units_per_em: u16,
    pub glyph_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFile {
    pub ext: Flavor,
    pub file: String,
    pub recommended_file: String,
    pub bytes: usize,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
}

#[derive(Debug, Serialize)]
pub struct CodepointCounts {
    #[serde(rename = "codepointsTotal")]
    pub total: usize,
    #[serde(rename = "codepointsBMP")]
    pub bmp: usize,
    #[serde(rename = "codepointsAstral")]
    pub astral: usize,
}

/// Declared OpenType layout feature tags. The compiler emits no GSUB or GPOS
/// tables, so both stay empty.
#[derive(Debug, Default, Serialize)]
pub struct FeatureTags {
    #[serde(rename = "GSUB")]
    pub gsub: Vec<String>,
    #[serde(rename = "GPOS")]
    pub gpos: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestHints {
    pub common_blocks: CommonBlocks,
    pub preferred_lowercase_filenames: bool,
    pub has_casing_mismatches: bool,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonBlocks {
    pub basic_latin: bool,
    pub latin1_supplement: bool,
    pub latin_extended_a: bool,
    pub latin_extended_b: bool,
}

impl CommonBlocks {
    fn from_ranges(ranges: &[[u32; 2]]) -> Self {
        Self {
            basic_latin: intersects(ranges, 0x20, 0x7E),
            latin1_supplement: intersects(ranges, 0xA0, 0xFF),
            latin_extended_a: intersects(ranges, 0x100, 0x17F),
            latin_extended_b: intersects(ranges, 0x180, 0x24F),
        }
    }
}

impl ManifestFile {
    /// Entry for a written font file. `path` is only used for its file name.
    pub fn new(name: &str, flavor: Flavor, path: &Path, data: &[u8]) -> Self {
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            ext: flavor,
            file,
            recommended_file: format!("{}.{}", name.to_lowercase(), flavor.extension()),
            bytes: data.len(),
            sha256: format!("{:x}", Sha256::digest(data)),
        }
    }
}

/// Build the manifest for one set of font files sharing `tables`.
pub fn build_manifest(
    name: &str,
    tables: &FontTables,
    files: Vec<ManifestFile>,
    clock: &BuildClock,
) -> Manifest {
    let header = &tables.header;
    let codepoints: Vec<u32> = tables.cmap.keys().copied().collect();
    let ranges = compress_to_ranges(&codepoints);
    let bmp = codepoints.iter().filter(|&&cp| cp <= BMP_MAX).count();
    let has_casing_mismatches = files.iter().any(|f| f.file != f.recommended_file);

    Manifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: clock.rfc3339(),
        name: name.to_lowercase(),
        metadata: ManifestMetadata {
            family: header.family.clone(),
            subfamily: header.style.clone(),
            full_name: header.full_name(),
            post_script_name: header.postscript_name(),
            units_per_em: header.units_per_em,
            glyph_count: tables.glyphs.len(),
        },
        files,
        counts: CodepointCounts {
            total: codepoints.len(),
            bmp,
            astral: codepoints.len() - bmp,
        },
        features: FeatureTags::default(),
        hints: ManifestHints {
            common_blocks: CommonBlocks::from_ranges(&ranges),
            preferred_lowercase_filenames: true,
            has_casing_mismatches,
        },
        unicode_ranges: ranges,
    }
}

/// Collapse sorted, deduplicated codepoints into inclusive `[start, end]` runs.
pub fn compress_to_ranges(codepoints: &[u32]) -> Vec<[u32; 2]> {
    let mut ranges: Vec<[u32; 2]> = Vec::new();
    for &cp in codepoints {
        match ranges.last_mut() {
            Some(last) if last[1].checked_add(1) == Some(cp) => last[1] = cp,
            Some(last) if last[1] >= cp => {}
            _ => ranges.push([cp, cp]),
        }
    }
    ranges
}

fn intersects(ranges: &[[u32; 2]], lo: u32, hi: u32) -> bool {
    ranges.iter().any(|&[a, b]| a <= hi && b >= lo)
}

pub fn write_manifest_json(manifest: &Manifest, path: &Path) -> Result<()> {
    let mut json = serde_json::to_string_pretty(manifest).map_err(|e| DefontError::Build {
        message: format!("Failed to serialize manifest: {}", e),
        help: None,
    })?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DefontError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create directory: {}", e),
        })?;
    }
    fs::write(path, json).map_err(|e| DefontError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write manifest: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{FontHeader, TableGlyph};
    use crate::types::Outline;
    use std::collections::BTreeMap;

    fn tables(codepoints: &[u32]) -> FontTables {
        let glyph = |name: &str| TableGlyph {
            name: name.to_string(),
            advance_width: 500,
            left_side_bearing: 0,
            outline: Outline::default(),
        };
        FontTables {
            header: FontHeader {
                family: "Deidee Mono".to_string(),
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
            },
            glyphs: vec![glyph(".notdef"), glyph("space")],
            cmap: codepoints
                .iter()
                .map(|&cp| (cp, "space".to_string()))
                .collect::<BTreeMap<_, _>>(),
            palette: None,
            color_glyphs: Vec::new(),
        }
    }

    #[test]
    fn test_compress_to_ranges() {
        assert_eq!(
            compress_to_ranges(&[0x20, 0x41, 0x42, 0x43, 0x61, 0x1F600]),
            vec![[0x20, 0x20], [0x41, 0x43], [0x61, 0x61], [0x1F600, 0x1F600]]
        );
        assert!(compress_to_ranges(&[]).is_empty());
    }

    #[test]
    fn test_counts_and_blocks() {
        let manifest = build_manifest(
            "Deidee",
            &tables(&[0x20, 0x41, 0xE9, 0x1F600]),
            Vec::new(),
            &BuildClock::from_timestamp(0),
        );
        assert_eq!(manifest.name, "deidee");
        assert_eq!(manifest.counts.total, 4);
        assert_eq!(manifest.counts.bmp, 3);
        assert_eq!(manifest.counts.astral, 1);
        assert_eq!(
            manifest.hints.common_blocks,
            CommonBlocks {
                basic_latin: true,
                latin1_supplement: true,
                latin_extended_a: false,
                latin_extended_b: false,
            }
        );
    }

    #[test]
    fn test_file_entry_digest() {
        let empty = ManifestFile::new("deidee", Flavor::Ttf, Path::new("deidee.ttf"), &[]);
        assert_eq!(empty.bytes, 0);
        assert_eq!(
            empty.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );

        let font = ManifestFile::new(
            "deidee",
            Flavor::Woff2,
            Path::new("deidee.woff2"),
            &[0, 1, 0, 0],
        );
        assert_eq!(font.bytes, 4);
        assert_eq!(font.sha256.len(), 64);
        assert_ne!(font.sha256, empty.sha256);
    }

    #[test]
    fn test_casing_mismatch() {
        let files = vec![ManifestFile::new(
            "deidee",
            Flavor::Woff,
            Path::new("dist/Deidee.woff"),
            &[0; 10],
        )];
        assert_eq!(files[0].recommended_file, "deidee.woff");
        let manifest = build_manifest("deidee", &tables(&[0x20]), files, &BuildClock::from_timestamp(0));
        assert!(manifest.hints.has_casing_mismatches);
    }

    #[test]
    fn test_manifest_json() {
        let files = vec![ManifestFile::new(
            "deidee",
            Flavor::Ttf,
            Path::new("out/deidee.ttf"),
            b"defont",
        )];
        let manifest = build_manifest(
            "deidee",
            &tables(&[0x20, 0x21]),
            files,
            &BuildClock::from_timestamp(0),
        );
        let value = serde_json::to_value(&manifest).unwrap();

        insta::assert_json_snapshot!(value, @r###"
        {
          "manifestVersion": 1,
          "generatedAt": "1970-01-01T00:00:00Z",
          "name": "deidee",
          "metadata": {
            "family": "Deidee Mono",
            "subfamily": "Regular",
            "fullName": "Deidee Mono Regular",
            "postScriptName": "DeideeMono-Regular",
            "unitsPerEm": 1000,
            "glyphCount": 2
          },
          "files": [
            {
              "ext": "ttf",
              "file": "deidee.ttf",
              "recommendedFile": "deidee.ttf",
              "bytes": 6,
              "sha256": "3693ceb2c23c9e3d62a572d4d43bb461750bbbfb37b5c134450d6c1cffa090cd"
            }
          ],
          "unicodeRanges": [
            [
              32,
              33
            ]
          ],
          "counts": {
            "codepointsTotal": 2,
            "codepointsBMP": 2,
            "codepointsAstral": 0
          },
          "features": {
            "GSUB": [],
            "GPOS": []
          },
          "hints": {
            "commonBlocks": {
              "basicLatin": true,
              "latin1Supplement": false,
              "latinExtendedA": false,
              "latinExtendedB": false
            },
            "preferredLowercaseFilenames": true,
            "hasCasingMismatches": false
          }
        }
        "###);
    }
}
