//! Colour palettes and the "de-jade" palette generator.

use crate::compiler::RandomStream;
use crate::error::{DefontError, Result};

use super::Colour;

/// Default translucency of generated entries (about 50%).
pub const DEFAULT_ALPHA: u8 = 128;

/// Largest palette a font can carry: CPAL and COLR address entries with u16.
pub const MAX_PALETTE_SIZE: usize = u16::MAX as usize;

/// Month (1-12) on which the seasonal palette path applies.
pub const SEASONAL_MONTH: u32 = 10;

/// Accent written to entry 0 on the seasonal path (alpha comes from the build).
pub const SEASONAL_ACCENT: Colour = Colour::rgb(255, 68, 136);

const RED_RANGE: (u32, u32) = (0, 127);
const GREEN_RANGE: (u32, u32) = (127, 255);
const BLUE_RANGE: (u32, u32) = (0, 191);

/// An ordered list of colours referenced by index from colour layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Colour>,
}

impl Palette {
    pub fn new(entries: Vec<Colour>) -> Self {
        Self { entries }
    }

    pub fn get(&self, index: usize) -> Option<Colour> {
        self.entries.get(index).copied()
    }

    pub fn entries(&self) -> &[Colour] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Colour> {
        self.entries.iter()
    }
}

/// Which palette path a build takes, decided by the injected build month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PalettePath {
    Normal,
    Seasonal,
}

impl PalettePath {
    pub fn for_month(month: u32) -> Self {
        if month == SEASONAL_MONTH {
            PalettePath::Seasonal
        } else {
            PalettePath::Normal
        }
    }
}

/// Generates translucent jade-leaning palettes from the build's random stream.
///
/// Each entry draws red in 0..=127, green in 127..=255 and blue in 0..=191.
/// On the seasonal path entry 0 becomes the accent colour and the whole
/// palette is then shuffled with the same stream.
#[derive(Debug, Clone)]
pub struct PaletteGenerator {
    size: usize,
    alpha: u8,
    path: PalettePath,
}

impl PaletteGenerator {
    pub fn new(size: usize, alpha: u8) -> Result<Self> {
        if size == 0 {
            return Err(DefontError::Config {
                message: "palette size must be at least 1".to_string(),
                help: Some("Pass --palette-size 1 or more".to_string()),
            });
        }
        if size > MAX_PALETTE_SIZE {
            return Err(DefontError::Config {
                message: format!("palette size {} exceeds {}", size, MAX_PALETTE_SIZE),
                help: Some("CPAL indices are 16-bit".to_string()),
            });
        }

        Ok(Self {
            size,
            alpha,
            path: PalettePath::Normal,
        })
    }

    /// Select the palette path from the build month (1-12).
    pub fn with_month(mut self, month: u32) -> Self {
        self.path = PalettePath::for_month(month);
        self
    }

    pub fn path(&self) -> PalettePath {
        self.path
    }

    /// Draw the palette from `stream`.
    pub fn generate(&self, stream: &mut RandomStream) -> Palette {
        let mut entries: Vec<Colour> = (0..self.size)
            .map(|_| {
                let r = stream.range_inclusive(RED_RANGE.0, RED_RANGE.1) as u8;
                let g = stream.range_inclusive(GREEN_RANGE.0, GREEN_RANGE.1) as u8;
                let b = stream.range_inclusive(BLUE_RANGE.0, BLUE_RANGE.1) as u8;
                Colour::new(r, g, b, self.alpha)
            })
            .collect();

        if self.path == PalettePath::Seasonal {
            entries[0] = SEASONAL_ACCENT.with_alpha(self.alpha);
            stream.shuffle(&mut entries);
        }

        Palette::new(entries)
    }

    /// Generate from a fresh stream seeded with `seed`.
    pub fn generate_seeded(&self, seed: u32) -> Palette {
        self.generate(&mut RandomStream::new(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(PaletteGenerator::new(0, DEFAULT_ALPHA).is_err());
    }

    #[test]
    fn test_oversized_palette_rejected() {
        assert!(PaletteGenerator::new(MAX_PALETTE_SIZE, DEFAULT_ALPHA).is_ok());
        let err = PaletteGenerator::new(MAX_PALETTE_SIZE + 1, DEFAULT_ALPHA).unwrap_err();
        assert!(err.to_string().contains("65536"));
    }

    #[test]
    fn test_entries_in_jade_ranges() {
        let palette = PaletteGenerator::new(200, 128)
            .unwrap()
            .with_month(3)
            .generate_seeded(42);

        assert_eq!(palette.len(), 200);
        for c in palette.iter() {
            assert!(c.r <= 127);
            assert!(c.g >= 127);
            assert!(c.b <= 191);
            assert_eq!(c.a, 128);
        }
    }

    #[test]
    fn test_same_inputs_same_palette() {
        let generator = PaletteGenerator::new(16, 100).unwrap().with_month(10);
        assert_eq!(generator.generate_seeded(5), generator.generate_seeded(5));

        let generator = PaletteGenerator::new(16, 100).unwrap().with_month(4);
        assert_eq!(generator.generate_seeded(5), generator.generate_seeded(5));
    }

    #[test]
    fn test_seasonal_path_contains_accent() {
        let generator = PaletteGenerator::new(8, 90).unwrap().with_month(SEASONAL_MONTH);
        assert_eq!(generator.path(), PalettePath::Seasonal);

        let palette = generator.generate_seeded(1);
        let accent = SEASONAL_ACCENT.with_alpha(90);
        assert_eq!(palette.iter().filter(|&&c| c == accent).count(), 1);
    }

    #[test]
    fn test_normal_path_has_no_accent() {
        let palette = PaletteGenerator::new(64, 128)
            .unwrap()
            .with_month(9)
            .generate_seeded(1);
        // The accent's red channel is out of the generated range.
        assert!(palette.iter().all(|c| c.r <= 127));
    }

    #[test]
    fn test_single_entry_seasonal() {
        let palette = PaletteGenerator::new(1, 128)
            .unwrap()
            .with_month(10)
            .generate_seeded(3);
        assert_eq!(palette.entries(), &[SEASONAL_ACCENT.with_alpha(128)]);
    }

    #[test]
    fn test_path_for_month() {
        assert_eq!(PalettePath::for_month(10), PalettePath::Seasonal);
        assert_eq!(PalettePath::for_month(1), PalettePath::Normal);
        assert_eq!(PalettePath::for_month(12), PalettePath::Normal);
    }
}
