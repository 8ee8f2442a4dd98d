//! JSON documents derived from a glyph table or a finished build.

mod data;
mod manifest;

pub use data::{
    export_table, render_data, to_json, write_data, DataFormat, DataMeta, ExportKey, GlyphData,
    GlyphEntry, DATA_FORMAT, DATA_VERSION,
};
pub use manifest::{
    build_manifest, compress_to_ranges, write_manifest_json, CodepointCounts, CommonBlocks,
    FeatureTags, Manifest, ManifestFile, ManifestHints, ManifestMetadata, MANIFEST_VERSION,
};
