//! Pixel colour assignment.
//!
//! The hashed mode is a versioned algorithm: the constants below fix every
//! reproducible output, so changing any of them changes every font built
//! from a given seed.

use serde::{Deserialize, Serialize};

use crate::types::MAX_PALETTE_SIZE;

/// Multiplier applied to the build seed.
pub const SEED_MULTIPLIER: u32 = 131_071;

/// Multiplier applied to the glyph identity.
pub const IDENTITY_MULTIPLIER: u32 = 4_099;

/// Xor-shift amounts of the three avalanche rounds.
const MIX_SHIFTS: [u32; 3] = [16, 15, 16];

/// Multipliers of the three avalanche rounds.
const MIX_MULTIPLIERS: [u32; 3] = [0x7FEB_352D, 0x846C_A68B, 0x27D4_EB2D];

/// How "on" pixels are mapped to palette entries. One mode per build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    /// Pure hash of `(seed, glyph identity, pixel index)`; palette size is
    /// the configured size.
    #[default]
    Hashed,
    /// Indices 0, 1, 2, … in build order, clamped to the last entry; the
    /// palette holds one entry per "on" pixel in the table plus one.
    Sequential,
}

/// 32-bit avalanche over the combined key.
pub fn mix(mut x: u32) -> u32 {
    for (shift, multiplier) in MIX_SHIFTS.iter().zip(MIX_MULTIPLIERS.iter()) {
        x ^= x >> shift;
        x = x.wrapping_mul(*multiplier);
    }
    x
}

/// Palette index of one pixel under the hashed mode.
pub fn hashed_index(seed: u32, identity: u32, pixel_index: u32, palette_size: u16) -> u16 {
    debug_assert!(palette_size > 0);
    let key = seed
        .wrapping_mul(SEED_MULTIPLIER)
        .wrapping_add(identity.wrapping_mul(IDENTITY_MULTIPLIER))
        .wrapping_add(pixel_index);
    let index = mix(key) % u32::from(palette_size.max(1));
    // below palette_size, so it fits
    index as u16
}

/// Assigns palette indices to pixels for one build.
///
/// Hashed assignment is stateless; sequential assignment carries its cursor
/// across glyphs, so glyphs must be fed in glyph order.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    mode: AssignmentMode,
    seed: u32,
    palette_size: u16,
    next: u16,
}

impl ColorAssigner {
    /// `palette_size` is clamped to `1..=MAX_PALETTE_SIZE`.
    pub fn new(mode: AssignmentMode, seed: u32, palette_size: usize) -> Self {
        debug_assert!(palette_size > 0);
        Self {
            mode,
            seed,
            palette_size: palette_size.clamp(1, MAX_PALETTE_SIZE) as u16,
            next: 0,
        }
    }

    pub fn mode(&self) -> AssignmentMode {
        self.mode
    }

    pub fn assign(&mut self, identity: u32, pixel_index: usize) -> u16 {
        match self.mode {
            AssignmentMode::Hashed => {
                hashed_index(self.seed, identity, pixel_index as u32, self.palette_size)
            }
            AssignmentMode::Sequential => {
                let index = self.next;
                self.next = self.next.saturating_add(1).min(self.palette_size - 1);
                index
            }
        }
    }
}

/// Palette size a build needs for `mode`.
///
/// Sequential builds stop growing at `MAX_PALETTE_SIZE`; later pixels share
/// the last entry.
pub fn palette_size_for(mode: AssignmentMode, configured: usize, total_on_pixels: usize) -> usize {
    match mode {
        AssignmentMode::Hashed => configured,
        AssignmentMode::Sequential => total_on_pixels.saturating_add(1).min(MAX_PALETTE_SIZE),
    }
}
