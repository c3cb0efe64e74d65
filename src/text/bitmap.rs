use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};

use crate::foundation::error::{LogoError, LogoResult};
use crate::text::face::{FontFace, GlyphMask, TextExtent, check_size};
use crate::text::symbols::symbol_bitmap;

const GRID: u32 = 8;
const MAX_MASK_PIXELS: u64 = 1 << 26;

/// Built-in face backed by the `font8x8` bitmaps.
///
/// Every glyph occupies a square cell of `round(size_px)` pixels sampled nearest-neighbour from
/// the 8x8 grid, so metrics are exact integers and need no font assets. Newlines start a new row
/// of cells; decoration symbols use their own bitmaps and anything else without one renders as
/// `?`.
#[derive(Clone, Debug)]
pub struct BitmapFace {
    family: String,
}

impl Default for BitmapFace {
    fn default() -> Self {
        Self::new()
    }
}

impl BitmapFace {
    /// Construct the built-in face.
    pub fn new() -> Self {
        Self {
            family: "font8x8".to_string(),
        }
    }

    fn cell(size_px: f32) -> u32 {
        (size_px.round() as u32).max(1)
    }

    fn glyph(ch: char) -> [u8; 8] {
        BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| symbol_bitmap(ch))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }

    fn grid(text: &str) -> (u32, u32) {
        let cols = text
            .split('\n')
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let rows = text.split('\n').count();
        (cols as u32, rows as u32)
    }
}

impl FontFace for BitmapFace {
    fn family(&self) -> &str {
        &self.family
    }

    fn measure(&self, text: &str, size_px: f32) -> LogoResult<TextExtent> {
        check_size(size_px)?;
        let cell = Self::cell(size_px);
        let (cols, rows) = Self::grid(text);
        Ok(TextExtent {
            width: cols.saturating_mul(cell),
            height: rows.saturating_mul(cell),
        })
    }

    fn rasterize(&self, text: &str, size_px: f32) -> LogoResult<GlyphMask> {
        let extent = self.measure(text, size_px)?;
        if u64::from(extent.width) * u64::from(extent.height) > MAX_MASK_PIXELS {
            return Err(LogoError::render(format!(
                "text raster of {}x{} is too large",
                extent.width, extent.height
            )));
        }
        let cell = Self::cell(size_px);
        let stride = extent.width as usize;
        let mut coverage = vec![0u8; stride * extent.height as usize];

        for (row, line) in text.split('\n').enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let bits = Self::glyph(ch);
                let ox = col as u32 * cell;
                let oy = row as u32 * cell;
                for y in 0..cell {
                    let bits_row = bits[(y * GRID / cell) as usize];
                    if bits_row == 0 {
                        continue;
                    }
                    let line_start = ((oy + y) as usize) * stride;
                    for x in 0..cell {
                        if (bits_row >> (x * GRID / cell)) & 1 == 1 {
                            coverage[line_start + (ox + x) as usize] = 255;
                        }
                    }
                }
            }
        }

        GlyphMask::new(extent.width, extent.height, coverage)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/bitmap.rs"]
mod tests;
