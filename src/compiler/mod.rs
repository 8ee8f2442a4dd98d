//! Bitmap glyph compiler.
//!
//! Turns a [`GlyphTable`] into vector glyphs with metrics and colour layers.
//! One [`RandomStream`] is seeded per build and consumed in a fixed order:
//!
//! 1. palette entries, red/green/blue per entry
//! 2. the seasonal shuffle, when the build month selects it
//! 3. one jitter draw per "on" pixel, glyphs in glyph order, pixels row-major
//!
//! The palette is drawn even for monochrome builds so that outlines match the
//! colour build for the same seed.

mod assign;
mod clock;
mod coords;
mod layers;
mod metrics;
mod random;
mod validate;

pub use assign::{
    hashed_index, mix, palette_size_for, AssignmentMode, ColorAssigner, IDENTITY_MULTIPLIER,
    SEED_MULTIPLIER,
};
pub use clock::BuildClock;
pub use coords::{CellLayout, CoordinateMapper, JITTER_REFERENCE_CELL};
pub use layers::{BaseOutline, Decomposition, LayerDecomposer, RenderMode};
pub use metrics::{verify_metrics, MetricsComputer};
pub use random::RandomStream;
pub use validate::{GlyphValidator, GridCheck};

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::Result;
use crate::source::GlyphTable;
use crate::types::{Glyph, GlyphKey, Palette, PaletteGenerator, PixelGrid, DEFAULT_ALPHA, SPACE};
use crate::validation::{Diagnostic, ValidationResult};

/// Highest valid Unicode scalar value.
const MAX_CODEPOINT: u32 = 0x10_FFFF;

/// Build-wide compiler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub layout: CellLayout,
    /// 0 derives `YYYYMMDD` from the build clock.
    pub seed: u32,
    /// Maximum jitter in reference pixels; 0 disables it.
    pub jitter: u32,
    pub palette_size: usize,
    pub alpha: u8,
    pub mode: RenderMode,
    pub base_outline: BaseOutline,
    pub assignment: AssignmentMode,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            layout: CellLayout::default(),
            seed: 0,
            jitter: 3,
            palette_size: 32,
            alpha: DEFAULT_ALPHA,
            mode: RenderMode::Color,
            base_outline: BaseOutline::Empty,
            assignment: AssignmentMode::Hashed,
        }
    }
}

impl CompileOptions {
    /// The seed actually used for a build at `clock`.
    pub fn resolve_seed(&self, clock: &BuildClock) -> u32 {
        if self.seed == 0 {
            clock.date_seed()
        } else {
            self.seed
        }
    }
}

/// Everything one build produced.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Drawn glyphs in glyph order (`.notdef`, `space`, codepoints, names).
    pub glyphs: Vec<Glyph>,
    pub palette: Palette,
    pub seed: u32,
    pub layout: CellLayout,
    pub mode: RenderMode,
    /// Skipped entries and other source defects.
    pub report: ValidationResult,
}

impl Compilation {
    pub fn glyph(&self, name: &str) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.name == name)
    }

    pub fn layer_count(&self) -> usize {
        self.glyphs.iter().map(|g| g.layers.len()).sum()
    }
}

/// Total glyph order: `.notdef`, `space`, codepoints ascending, names
/// ascending.
pub fn glyph_order(a: &GlyphKey, b: &GlyphKey) -> Ordering {
    fn rank(key: &GlyphKey) -> u8 {
        if key.is_notdef() {
            0
        } else if key.is_space() {
            1
        } else {
            2
        }
    }
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

/// Drives validation, palette generation, decomposition and metrics.
#[derive(Debug, Clone)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Validate the table without drawing anything.
    pub fn validate(&self, table: &GlyphTable) -> (Vec<(GlyphKey, PixelGrid)>, ValidationResult) {
        let validator = GlyphValidator::new(self.options.layout.rows);
        let mut report = ValidationResult::new();
        let mut accepted = Vec::new();

        let generated: HashSet<String> = table
            .keys()
            .filter(|k| k.codepoint().is_some())
            .map(GlyphKey::glyph_name)
            .chain(std::iter::once(SPACE.to_string()))
            .collect();

        for (key, pixels) in table.iter() {
            if let Some(diagnostic) = check_key(key, &generated) {
                report.push(diagnostic);
                continue;
            }
            match validator.accept(key, pixels) {
                Ok(grid) => accepted.push((key.clone(), grid)),
                Err(diagnostic) => report.push(diagnostic),
            }
        }

        accepted.sort_by(|(a, _), (b, _)| glyph_order(a, b));
        (accepted, report)
    }

    pub fn compile(&self, table: &GlyphTable, clock: &BuildClock) -> Result<Compilation> {
        let options = &self.options;
        let seed = options.resolve_seed(clock);
        let (grids, report) = self.validate(table);

        let total_on: usize = grids.iter().map(|(_, g)| g.active_count()).sum();
        let palette_size = palette_size_for(options.assignment, options.palette_size, total_on);

        let mut stream = RandomStream::new(seed);
        let palette = PaletteGenerator::new(palette_size, options.alpha)?
            .with_month(clock.month())
            .generate(&mut stream);

        let mapper = CoordinateMapper::new(options.layout, options.jitter);
        let decomposer = LayerDecomposer::new(options.mode, options.base_outline);
        let metrics = MetricsComputer::new(options.layout);
        let mut assigner = ColorAssigner::new(options.assignment, seed, palette.len());

        let mut glyphs = Vec::with_capacity(grids.len());
        for (key, grid) in grids {
            let name = key.glyph_name();
            let decomposition =
                decomposer.decompose(&key, &grid, &mapper, &mut assigner, &mut stream);
            let (outline, layers) = decomposition.into_layer_glyphs(&name);

            let mut glyph = Glyph {
                key,
                name,
                advance_width: metrics.advance_width(grid.cols()),
                left_side_bearing: 0,
                outline,
                layers,
            };
            metrics.apply(&mut glyph);
            verify_metrics(&glyph)?;
            glyphs.push(glyph);
        }

        Ok(Compilation {
            glyphs,
            palette,
            seed,
            layout: options.layout,
            mode: options.mode,
            report,
        })
    }
}

fn check_key(key: &GlyphKey, generated: &HashSet<String>) -> Option<Diagnostic> {
    match key {
        GlyphKey::Codepoint(cp) if *cp > MAX_CODEPOINT || (0xD800..=0xDFFF).contains(cp) => Some(
            Diagnostic::warning(
                "defont::validate::codepoint-range",
                format!("Skipping {}: not a Unicode scalar value", key),
            )
            .for_key(key.clone()),
        ),
        GlyphKey::Named(name) if name.is_empty() => Some(
            Diagnostic::warning(
                "defont::validate::name-collision",
                "Skipping glyph with an empty name".to_string(),
            )
            .for_key(key.clone()),
        ),
        GlyphKey::Named(name) if generated.contains(name) || is_layer_name(name) => Some(
            Diagnostic::warning(
                "defont::validate::name-collision",
                format!("Skipping {}: name clashes with a generated glyph name", key),
            )
            .for_key(key.clone())
            .with_help("Rename the entry or key it by codepoint instead"),
        ),
        _ => None,
    }
}

/// `{base}.p{digits}` is reserved for colour layers.
fn is_layer_name(name: &str) -> bool {
    name.rsplit_once(".p").is_some_and(|(base, index)| {
        !base.is_empty() && !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())
    })
}
