use crate::foundation::error::{LogoError, LogoResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Pixel extent of laid-out text.
pub struct TextExtent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TextExtent {
    /// Whether the extent fits inside a `width x height` box.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width <= width && self.height <= height
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// 8-bit glyph coverage raster, row-major, tight to the measured [`TextExtent`].
pub struct GlyphMask {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Coverage per pixel, `width * height` bytes.
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    /// Wrap a coverage buffer, checking its length.
    pub fn new(width: u32, height: u32, coverage: Vec<u8>) -> LogoResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| LogoError::render("glyph mask size overflow"))?;
        if coverage.len() != expected {
            return Err(LogoError::render(
                "glyph mask expects coverage matching width*height",
            ));
        }
        Ok(Self {
            width,
            height,
            coverage,
        })
    }

    /// Coverage at `(x, y)`, zero outside the mask.
    pub fn at(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0;
        }
        self.coverage[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Extent of the mask.
    pub fn extent(&self) -> TextExtent {
        TextExtent {
            width: self.width,
            height: self.height,
        }
    }
}

/// Glyph metrics and rasterization source.
///
/// Font fitting and drawing must go through the same face, otherwise the fitted size and the
/// drawn pixels disagree. `rasterize(text, size).extent()` equals `measure(text, size)`.
pub trait FontFace: Send + Sync {
    /// Human-readable family name.
    fn family(&self) -> &str;

    /// Measure `text` at `size_px`.
    fn measure(&self, text: &str, size_px: f32) -> LogoResult<TextExtent>;

    /// Rasterize `text` at `size_px` into a coverage mask.
    fn rasterize(&self, text: &str, size_px: f32) -> LogoResult<GlyphMask>;
}

pub(crate) fn check_size(size_px: f32) -> LogoResult<()> {
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(LogoError::render("text size_px must be finite and > 0"));
    }
    Ok(())
}
