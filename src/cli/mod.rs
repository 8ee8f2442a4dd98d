pub mod build;
pub mod completions;
pub mod data;
pub mod palette;
pub mod validate;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::source::{open_source, GlyphTable};

/// defont - Bitmap glyph table to colour font compiler
#[derive(Parser, Debug)]
#[command(name = "defont")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a glyph table into font files
    Build(build::BuildArgs),

    /// Check a glyph table without writing fonts
    Validate(validate::ValidateArgs),

    /// Export a glyph table as JSON
    Data(data::DataArgs),

    /// Print the palette a seed generates
    Palette(palette::PaletteArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Where the glyph table comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Glyph table (.php or .json); defaults to the config's source
    pub source: Option<PathBuf>,

    /// Evaluate PHP sources with the php interpreter instead of parsing them
    #[arg(long)]
    pub php: bool,

    /// Config file (default: ./defont.yaml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    /// Load the config, with the positional source overriding its `source`.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::discover(self.config.as_deref())?;
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        Ok(config)
    }

    /// Read the glyph table named by `config`.
    pub fn load_table(&self, config: &Config, printer: &Printer) -> Result<GlyphTable> {
        let source = open_source(&config.source, self.php);
        let table = source.load()?;
        printer.status(
            "Loaded",
            &format!(
                "{} from {}",
                plural(table.len(), "glyph", "glyphs"),
                printer.accent(&display_path(&config.source))
            ),
        );
        Ok(table)
    }
}
