//! Project configuration (defont.yaml).
//!
//! Every field is optional; command-line flags override whatever the file
//! sets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assemble::FontInfo;
use crate::compiler::{AssignmentMode, BaseOutline, CellLayout, CompileOptions, RenderMode};
use crate::container::Flavor;
use crate::error::{DefontError, Result};
use crate::types::{DEFAULT_ALPHA, MAX_PALETTE_SIZE};

/// Conventional configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "defont.yaml";

/// Project configuration loaded from defont.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glyph table to compile.
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Output path without extension; one file per format is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    pub family: String,
    pub style: String,
    pub vendor: String,
    pub vendor_url: Option<String>,

    /// 0 derives the seed from the build date.
    pub seed: u32,
    pub jitter: u32,
    pub palette_size: usize,
    pub alpha: u8,
    pub mode: RenderMode,
    pub base_outline: BaseOutline,
    pub assignment: AssignmentMode,
    pub formats: Vec<Flavor>,

    /// Optional manifest output path.
    pub manifest: Option<PathBuf>,

    pub metrics: MetricsConfig,
}

/// Em size, vertical metrics and the pixel cell layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub upm: i32,
    pub ascent: i32,
    pub descent: i32,
    pub rows: usize,
    pub cell: i32,
    pub left_pad: i32,
    pub right_pad: i32,
    pub bottom_pad: i32,
    pub letterspacing: i32,
}

fn default_source() -> PathBuf {
    PathBuf::from("chars.php")
}

fn default_output() -> PathBuf {
    PathBuf::from("dist/defont")
}

impl Default for Config {
    fn default() -> Self {
        let info = FontInfo::default();
        let options = CompileOptions::default();
        Self {
            source: default_source(),
            output: default_output(),
            family: info.family,
            style: info.style,
            vendor: info.vendor,
            vendor_url: info.vendor_url,
            seed: options.seed,
            jitter: options.jitter,
            palette_size: options.palette_size,
            alpha: DEFAULT_ALPHA,
            mode: options.mode,
            base_outline: options.base_outline,
            assignment: options.assignment,
            formats: Flavor::ALL.to_vec(),
            manifest: None,
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        let info = FontInfo::default();
        let layout = CellLayout::default();
        Self {
            upm: i32::from(info.units_per_em),
            ascent: i32::from(info.ascent),
            descent: i32::from(info.descent),
            rows: layout.rows,
            cell: layout.cell,
            left_pad: layout.left_pad,
            right_pad: layout.right_pad,
            bottom_pad: layout.bottom_pad,
            letterspacing: layout.letterspacing,
        }
    }
}

impl Config {
    /// Load configuration from a defont.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DefontError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Load `path` if given, else `defont.yaml` in the working directory if
    /// present, else the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).is_file() => Self::load(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| DefontError::Parse {
            message: format!("Invalid config: {}", e),
            help: Some("Check defont.yaml syntax".to_string()),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str, help: &str| DefontError::Config {
            message: message.to_string(),
            help: Some(help.to_string()),
        };

        if self.metrics.rows == 0 {
            return Err(invalid("metrics.rows must be at least 1", "Glyphs need one or more rows"));
        }
        if self.metrics.cell <= 0 {
            return Err(invalid("metrics.cell must be positive", "Use the cell size in font units, e.g. 90"));
        }
        if self.palette_size == 0 {
            return Err(invalid("palette_size must be at least 1", "The default is 32"));
        }
        if self.palette_size > MAX_PALETTE_SIZE {
            return Err(invalid(
                "palette_size must be at most 65535",
                "Colour layers address the palette with 16-bit indices",
            ));
        }
        if self.metrics.upm <= 0 || self.metrics.upm > i32::from(u16::MAX) {
            return Err(invalid(
                "metrics.upm must be between 1 and 65535",
                "Most fonts use 1000 or 2048",
            ));
        }
        for (name, value) in [("ascent", self.metrics.ascent), ("descent", self.metrics.descent)] {
            if i16::try_from(value).is_err() {
                return Err(DefontError::Config {
                    message: format!("metrics.{} {} does not fit a 16-bit font field", name, value),
                    help: None,
                });
            }
        }
        if self.formats.is_empty() {
            return Err(invalid(
                "formats must name at least one format",
                "Use any of ttf, woff and woff2",
            ));
        }
        Ok(())
    }

    pub fn layout(&self) -> CellLayout {
        CellLayout {
            rows: self.metrics.rows,
            cell: self.metrics.cell,
            left_pad: self.metrics.left_pad,
            right_pad: self.metrics.right_pad,
            bottom_pad: self.metrics.bottom_pad,
            letterspacing: self.metrics.letterspacing,
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            layout: self.layout(),
            seed: self.seed,
            jitter: self.jitter,
            palette_size: self.palette_size,
            alpha: self.alpha,
            mode: self.mode,
            base_outline: self.base_outline,
            assignment: self.assignment,
        }
    }

    /// Font naming and vertical metrics. Call after `validate`.
    pub fn font_info(&self) -> FontInfo {
        let defaults = FontInfo::default();
        FontInfo {
            family: self.family.clone(),
            style: self.style.clone(),
            vendor: self.vendor.clone(),
            vendor_url: self.vendor_url.clone(),
            units_per_em: u16::try_from(self.metrics.upm).unwrap_or(defaults.units_per_em),
            ascent: i16::try_from(self.metrics.ascent).unwrap_or(defaults.ascent),
            descent: i16::try_from(self.metrics.descent).unwrap_or(defaults.descent),
            ..defaults
        }
    }

    /// Formats to write, deduplicated in the order given.
    pub fn effective_formats(&self) -> Vec<Flavor> {
        let mut formats = Vec::with_capacity(self.formats.len());
        for flavor in &self.formats {
            if !formats.contains(flavor) {
                formats.push(*flavor);
            }
        }
        formats
    }

    /// Path written for one format: the output base plus the format's
    /// extension.
    pub fn output_path(&self, flavor: Flavor) -> PathBuf {
        let mut file = self.output.as_os_str().to_os_string();
        file.push(".");
        file.push(flavor.extension());
        PathBuf::from(file)
    }

    /// Lowercase base name used in the manifest.
    pub fn output_name(&self) -> String {
        self.output
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| self.family.to_lowercase())
    }
}
