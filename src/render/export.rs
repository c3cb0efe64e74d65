use std::io::Cursor;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{LogoError, LogoResult};
use crate::foundation::math::mul_div255_u8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Encoded format of the download-ready image.
pub enum ExportFormat {
    /// Lossless PNG (RGB8).
    #[default]
    Png,
    /// Baseline JPEG.
    Jpeg,
}

impl ExportFormat {
    /// MIME type for transports.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// How finalized renders are flattened and encoded.
pub struct ExportOpts {
    /// Output format.
    pub format: ExportFormat,
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
    /// Opaque color placed behind translucent pixels. Its alpha is ignored.
    pub matte: Rgba8,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            jpeg_quality: 92,
            matte: Rgba8::WHITE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Encoded, fully opaque final image.
pub struct ExportedImage {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Encoding used.
    pub format: ExportFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Flatten a straight-alpha image over the matte into opaque RGB8.
pub fn flatten(image: &image::RgbaImage, matte: Rgba8) -> image::RgbImage {
    let (width, height) = image.dimensions();
    image::RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let inv = 255 - u16::from(a);
        let mix = |c: u8, m: u8| {
            mul_div255_u8(u16::from(c), u16::from(a))
                .saturating_add(mul_div255_u8(u16::from(m), inv))
        };
        image::Rgb([mix(r, matte.r), mix(g, matte.g), mix(b, matte.b)])
    })
}

/// Flatten and encode a rendered image for delivery.
#[tracing::instrument(level = "debug", skip_all, fields(format = ?opts.format))]
pub fn export(image: &image::RgbaImage, opts: &ExportOpts) -> LogoResult<ExportedImage> {
    let rgb = flatten(image, opts.matte);
    let (width, height) = rgb.dimensions();

    let mut bytes = Vec::new();
    match opts.format {
        ExportFormat::Png => {
            image::DynamicImage::ImageRgb8(rgb)
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                .context("encode png")?;
        }
        ExportFormat::Jpeg => {
            if !(1..=100).contains(&opts.jpeg_quality) {
                return Err(LogoError::validation("jpeg_quality must be in 1..=100"));
            }
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, opts.jpeg_quality)
                .encode_image(&rgb)
                .context("encode jpeg")?;
        }
    }

    Ok(ExportedImage {
        bytes,
        format: opts.format,
        width,
        height,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
