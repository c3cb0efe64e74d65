use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{LogoError, LogoResult};

/// Hard cap on the glow radius; stamping cost grows with `r^2`.
pub const MAX_GLOW_RADIUS: u32 = 15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Effect drawn beneath the text glyphs.
pub enum EffectStyle {
    /// Plain glyphs.
    #[default]
    None,
    /// Fixed-radius halo in the contrasting color.
    Outline,
    /// Soft disc of text-colored copies.
    Glow,
    /// Randomly jittered copies faking a painted edge.
    Brushstroke,
}

impl EffectStyle {
    /// Every style, in menu order.
    pub const ALL: [Self; 4] = [Self::None, Self::Outline, Self::Glow, Self::Brushstroke];

    /// Lowercase name used by the command parser.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Outline => "outline",
            Self::Glow => "glow",
            Self::Brushstroke => "brushstroke",
        }
    }
}

impl fmt::Display for EffectStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectStyle {
    type Err = LogoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "plain" => Ok(Self::None),
            "outline" | "stroke" => Ok(Self::Outline),
            "glow" => Ok(Self::Glow),
            "brush" | "brushstroke" => Ok(Self::Brushstroke),
            other => Err(LogoError::validation(format!(
                "unknown effect style '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Tunables for the effect layers.
pub struct EffectOpts {
    /// Outline offset distance in pixels.
    pub outline_width: u32,
    /// Glow radius in pixels, capped at [`MAX_GLOW_RADIUS`].
    pub glow_radius: u32,
    /// Alpha of the glow color.
    pub glow_alpha: u8,
    /// Number of jittered brushstroke copies.
    pub brush_copies: u32,
    /// Maximum brushstroke jitter per axis in pixels.
    pub brush_jitter: u32,
}

impl Default for EffectOpts {
    fn default() -> Self {
        Self {
            outline_width: 2,
            glow_radius: 6,
            glow_alpha: 110,
            brush_copies: 8,
            brush_jitter: 3,
        }
    }
}

impl EffectOpts {
    /// Reject values that would make a layer degenerate or unbounded.
    pub fn validate(&self) -> LogoResult<()> {
        if self.outline_width == 0 {
            return Err(LogoError::validation("outline_width must be >= 1"));
        }
        if self.glow_radius > MAX_GLOW_RADIUS {
            return Err(LogoError::validation(format!(
                "glow_radius must be <= {MAX_GLOW_RADIUS}"
            )));
        }
        if self.brush_copies > 64 {
            return Err(LogoError::validation("brush_copies must be <= 64"));
        }
        Ok(())
    }
}

/// The 8 compass offsets at distance `width`.
pub(crate) fn outline_offsets(width: u32) -> Vec<(i32, i32)> {
    let w = width.max(1) as i32;
    vec![
        (-w, -w),
        (0, -w),
        (w, -w),
        (-w, 0),
        (w, 0),
        (-w, w),
        (0, w),
        (w, w),
    ]
}

/// Every integer offset in the disc `dx^2 + dy^2 <= r^2`, `r` capped at [`MAX_GLOW_RADIUS`].
pub(crate) fn glow_offsets(radius: u32) -> Vec<(i32, i32)> {
    let r = radius.min(MAX_GLOW_RADIUS) as i32;
    let mut out = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                out.push((dx, dy));
            }
        }
    }
    out
}

/// `copies` offsets within `±jitter` drawn from a ChaCha8 stream seeded by `seed`.
///
/// The ChaCha8 stream for a seed is stable across `rand` releases; `StdRng` is not.
pub(crate) fn brush_offsets(seed: u64, copies: u32, jitter: u32) -> Vec<(i32, i32)> {
    let j = jitter as i32;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..copies)
        .map(|_| (rng.gen_range(-j..=j), rng.gen_range(-j..=j)))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/style.rs"]
mod tests;
