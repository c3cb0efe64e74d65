use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::LogoError;
use crate::foundation::math::mul_div255_u8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Straight (non-premultiplied) RGBA8 color.
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied channel array.
    pub fn premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        [
            mul_div255_u8(u16::from(self.r), a),
            mul_div255_u8(u16::from(self.g), a),
            mul_div255_u8(u16::from(self.b), a),
            self.a,
        ]
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Black or white, whichever reads better against this color (Rec. 601 luma).
    pub fn contrasting(self) -> Self {
        let luma = 299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b);
        if luma >= 128_000 {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl FromStr for Rgba8 {
    type Err = LogoError;

    /// Accepts `#rrggbb`, `#rrggbbaa` (leading `#` optional) and a few color names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let named = match s.to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "red" => Some(Self::new(255, 0, 0, 255)),
            "green" => Some(Self::new(0, 128, 0, 255)),
            "blue" => Some(Self::new(0, 0, 255, 255)),
            "yellow" => Some(Self::new(255, 255, 0, 255)),
            "gold" => Some(Self::new(255, 215, 0, 255)),
            _ => None,
        };
        if let Some(c) = named {
            return Ok(c);
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(LogoError::validation(format!("invalid color '{s}'")));
        }
        let channel = |i: usize| -> Result<u8, LogoError> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| LogoError::validation(format!("invalid color '{s}'")))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Integer pixel offset of the text anchor from the centered position.
pub struct Offset {
    /// Horizontal offset, positive to the right.
    pub dx: i32,
    /// Vertical offset, positive downwards.
    pub dy: i32,
}

impl Offset {
    /// Construct an offset.
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Component-wise saturating add.
    pub fn saturating_add(self, dx: i32, dy: i32) -> Self {
        Self {
            dx: self.dx.saturating_add(dx),
            dy: self.dy.saturating_add(dy),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Placed text rectangle in canvas pixels. `x`/`y` may be negative or past the canvas.
pub struct TextBox {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TextBox {
    /// Center point, rounded down.
    pub fn center(&self) -> (i64, i64) {
        (
            self.x + i64::from(self.width) / 2,
            self.y + i64::from(self.height) / 2,
        )
    }

    /// Whether the box lies fully inside a `width x height` canvas.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x + i64::from(self.width) <= i64::from(width)
            && self.y + i64::from(self.height) <= i64::from(height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
