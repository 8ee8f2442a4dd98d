use std::path::PathBuf;

use clap::Args;

use crate::compiler::BuildClock;
use crate::error::{DefontError, Result};
use crate::output::{display_path, plural, Printer};
use crate::render::write_swatch;
use crate::types::{PaletteGenerator, PalettePath, DEFAULT_ALPHA};

/// Print the palette a seed generates
#[derive(Args, Debug, Clone)]
pub struct PaletteArgs {
    /// Build seed; 0 derives one from today's date
    #[arg(long, default_value_t = 0)]
    pub seed: u32,

    /// Number of palette entries
    #[arg(long, default_value_t = 32)]
    pub size: usize,

    /// Palette alpha (0-255)
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: u8,

    /// Build month (1-12); defaults to the current month
    #[arg(long)]
    pub month: Option<u32>,

    /// Also write a PNG swatch strip
    #[arg(long)]
    pub swatch: Option<PathBuf>,

    /// Swatch square size in pixels
    #[arg(long, default_value_t = 16)]
    pub cell: u32,
}

pub fn run(args: PaletteArgs, printer: &Printer) -> Result<()> {
    let clock = BuildClock::now();
    let month = args.month.unwrap_or_else(|| clock.month());
    if !(1..=12).contains(&month) {
        return Err(DefontError::Config {
            message: format!("month {} is out of range", month),
            help: Some("Use a month number from 1 to 12".to_string()),
        });
    }

    let seed = if args.seed == 0 { clock.date_seed() } else { args.seed };
    let generator = PaletteGenerator::new(args.size, args.alpha)?.with_month(month);
    let palette = generator.generate_seeded(seed);

    let seasonal = if generator.path() == PalettePath::Seasonal {
        ", seasonal"
    } else {
        ""
    };
    printer.status(
        "Generated",
        &format!(
            "{} (seed {}{})",
            plural(palette.len(), "colour", "colours"),
            seed,
            seasonal
        ),
    );

    // Palette lines go to stdout
    for (i, colour) in palette.iter().enumerate() {
        let (hue, saturation, lightness) = colour.hsl();
        println!(
            "{:>3}  {}  hsl({:.0}, {:.0}%, {:.0}%)",
            i,
            colour,
            hue,
            saturation * 100.0,
            lightness * 100.0
        );
    }

    if let Some(path) = &args.swatch {
        write_swatch(&palette, path, args.cell)?;
        printer.status("Writing", &display_path(path));
    }

    Ok(())
}
