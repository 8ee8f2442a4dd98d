//! Build command implementation.
//!
//! Compiles a glyph table and writes one font file per requested format,
//! plus an optional manifest.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use super::SourceArgs;
use crate::assemble::{EncodedFont, FontAssembler};
use crate::compiler::{
    AssignmentMode, BaseOutline, BuildClock, Compilation, Compiler, RenderMode,
};
use crate::config::Config;
use crate::container::{Flavor, FontTables, SfntContainer};
use crate::error::{DefontError, Result};
use crate::export::{build_manifest, write_manifest_json, ManifestFile};
use crate::output::{byte_size, display_path, plural, Printer};
use crate::source::GlyphTable;
use crate::validation::print_diagnostics;

/// Compile a glyph table into font files
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub input: SourceArgs,

    /// Output path without extension (writes OUTPUT.ttf, OUTPUT.woff, OUTPUT.woff2)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Font family name
    #[arg(long)]
    pub family: Option<String>,

    /// Font style name
    #[arg(long)]
    pub style: Option<String>,

    /// Vendor name
    #[arg(long)]
    pub vendor: Option<String>,

    /// Build seed; 0 derives one from today's date
    #[arg(long)]
    pub seed: Option<u32>,

    /// Number of palette entries
    #[arg(long)]
    pub palette_size: Option<usize>,

    /// Palette alpha (0-255)
    #[arg(long)]
    pub alpha: Option<u8>,

    /// Maximum pixel jitter; 0 disables it
    #[arg(long)]
    pub jitter: Option<u32>,

    /// Emit plain outlines without colour layers
    #[arg(long)]
    pub mono: bool,

    /// Keep a monochrome copy of every glyph under its colour layers
    #[arg(long)]
    pub fallback_base: bool,

    /// Assign palette entries in build order instead of hashing
    #[arg(long)]
    pub sequential: bool,

    /// Output format (repeatable)
    #[arg(long = "format", value_enum)]
    pub formats: Vec<Flavor>,

    /// Also write a JSON manifest to this path
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

impl BuildArgs {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(family) = &self.family {
            config.family = family.clone();
        }
        if let Some(style) = &self.style {
            config.style = style.clone();
        }
        if let Some(vendor) = &self.vendor {
            config.vendor = vendor.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(size) = self.palette_size {
            config.palette_size = size;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(jitter) = self.jitter {
            config.jitter = jitter;
        }
        if self.mono {
            config.mode = RenderMode::Monochrome;
        }
        if self.fallback_base {
            config.base_outline = BaseOutline::Fallback;
        }
        if self.sequential {
            config.assignment = AssignmentMode::Sequential;
        }
        if !self.formats.is_empty() {
            config.formats = self.formats.clone();
        }
        if self.manifest.is_some() {
            config.manifest = self.manifest.clone();
        }
    }
}

/// Everything a build produced before anything is written.
#[derive(Debug)]
pub struct FontBuild {
    pub compilation: Compilation,
    pub tables: FontTables,
    pub fonts: Vec<EncodedFont>,
}

/// Compile, assemble and encode every requested format in memory.
pub fn compile_fonts(config: &Config, table: &GlyphTable, clock: &BuildClock) -> Result<FontBuild> {
    let compilation = Compiler::new(config.compile_options()).compile(table, clock)?;
    let assembler = FontAssembler::new(config.font_info());
    let tables = assembler.assemble(&compilation, clock)?;
    let fonts = assembler.emit(&tables, &config.effective_formats(), &SfntContainer)?;

    Ok(FontBuild {
        compilation,
        tables,
        fonts,
    })
}

pub fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    let mut config = args.input.load_config()?;
    args.apply(&mut config);
    config.validate()?;

    let clock = BuildClock::now();
    let table = args.input.load_table(&config, printer)?;

    let build = compile_fonts(&config, &table, &clock)?;
    print_diagnostics(&build.compilation.report, printer);

    let compilation = &build.compilation;
    printer.status(
        "Compiled",
        &format!(
            "{} ({}, {}, seed {})",
            config.family,
            plural(compilation.glyphs.len(), "glyph", "glyphs"),
            plural(compilation.layer_count(), "layer", "layers"),
            compilation.seed
        ),
    );

    // Every flavor has encoded by now; nothing is written on failure.
    if let Some(parent) = config.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DefontError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    let name = config.output_name();
    let mut files = Vec::with_capacity(build.fonts.len());
    for font in &build.fonts {
        let path = config.output_path(font.flavor);
        fs::write(&path, &font.bytes).map_err(|e| DefontError::Io {
            path: path.clone(),
            message: format!("Failed to write font: {}", e),
        })?;
        printer.status(
            "Writing",
            &format!("{} {}", display_path(&path), printer.muted(&byte_size(font.bytes.len()))),
        );
        files.push(ManifestFile::new(&name, font.flavor, &path, &font.bytes));
    }

    if let Some(path) = &config.manifest {
        let manifest = build_manifest(&name, &build.tables, files, &clock);
        write_manifest_json(&manifest, path)?;
        printer.status("Writing", &display_path(path));
    }

    printer.status(
        "Finished",
        &plural(build.fonts.len(), "font file", "font files"),
    );

    Ok(())
}
