use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{LogoError, LogoResult, Rejection};
use crate::foundation::math::premultiply_rgba8_in_place;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Immutable session background in premultiplied RGBA8.
pub struct BackgroundImage {
    width: u32,
    height: u32,
    rgba8_premul: Vec<u8>,
}

impl BackgroundImage {
    /// Build from a straight-alpha image.
    pub fn from_rgba(image: image::RgbaImage) -> LogoResult<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(LogoError::decode("image has zero width or height"));
        }
        let mut rgba8_premul = image.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Ok(Self {
            width,
            height,
            rgba8_premul,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major premultiplied RGBA8 bytes.
    pub fn premul_bytes(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Content reference used by snapshots instead of the pixels themselves.
    pub fn reference(&self) -> BackgroundRef {
        BackgroundRef {
            fingerprint: format!("{:016x}", xxhash_rust::xxh3::xxh3_64(&self.rgba8_premul)),
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Stable identity of a background: xxh3 of its premultiplied pixels plus dimensions.
pub struct BackgroundRef {
    /// Hex xxh3-64 of the pixel bytes.
    pub fingerprint: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Limits applied before and after decoding an uploaded image.
pub struct DecodeLimits {
    /// Maximum encoded payload size.
    pub max_bytes: usize,
    /// Maximum `width * height`.
    pub max_pixels: u64,
}

/// Decode an uploaded raster image into a [`BackgroundImage`].
///
/// Oversized payloads and dimensions are input rejections; anything the codecs cannot read is a
/// decode failure.
pub fn decode_background(bytes: &[u8], limits: DecodeLimits) -> LogoResult<BackgroundImage> {
    if bytes.len() > limits.max_bytes {
        return Err(Rejection::PayloadTooLarge {
            size: bytes.len(),
            max: limits.max_bytes,
        }
        .into());
    }

    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LogoError::decode(format!("read image header: {e}")))?
        .into_dimensions()
        .map_err(|e| LogoError::decode(format!("read image dimensions: {e}")))?;
    if u64::from(width) * u64::from(height) > limits.max_pixels {
        return Err(Rejection::ImageTooLarge { width, height }.into());
    }

    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| LogoError::decode(format!("decode image from memory: {e}")))?;
    BackgroundImage::from_rgba(dyn_img.to_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
