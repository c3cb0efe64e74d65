use serde::{Deserialize, Serialize};

use crate::assets::decode::BackgroundImage;
use crate::effects::compositor::{CompositeInput, composite};
use crate::effects::style::EffectOpts;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::TextBox;
use crate::foundation::error::{LogoError, LogoResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::session::params::ParameterVector;
use crate::text::fit::{FitPolicy, fit_text_cancellable};
use crate::text::registry::FontRegistry;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Layout and effect knobs that are fixed per engine, not per session.
pub struct RenderSettings {
    /// Font-fit candidate sizes.
    pub fit: FitPolicy,
    /// Inset of the fit box from each canvas edge.
    pub fit_padding: u32,
    /// Effect layer tunables.
    pub effects: EffectOpts,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
/// Where and how large the text ended up.
pub struct LayoutMetrics {
    /// Size picked by the fit search, before scaling.
    pub fitted_font_size: u32,
    /// Whether the fitted size fits the box (false means the best-effort floor was used).
    pub fitted: bool,
    /// Size actually drawn (`fitted_font_size * scale`).
    pub font_size: f32,
    /// Placed glyph rectangle in canvas pixels.
    pub text_box: TextBox,
}

#[derive(Clone, Debug, PartialEq)]
/// One finished frame. Owned by the caller; the engine keeps no copy.
pub struct RenderResult {
    /// Straight-alpha RGBA8 image with the background's dimensions.
    pub image: image::RgbaImage,
    /// Layout of the drawn text.
    pub layout: LayoutMetrics,
}

/// Render `params` over `background` from scratch.
///
/// Nothing from earlier frames is reused: every call fits, rasterizes and composites again, so
/// identical inputs give byte-identical output and reverting a field reverts the image.
pub fn render(
    background: &BackgroundImage,
    params: &ParameterVector,
    fonts: &FontRegistry,
    settings: &RenderSettings,
) -> LogoResult<RenderResult> {
    render_cancellable(background, params, fonts, settings, &CancelToken::new())
}

/// [`render`] that stops with `Render("cancelled")` soon after `cancel` fires.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(
        width = background.width(),
        height = background.height(),
        font = %params.font,
        effect = %params.effect,
    )
)]
pub fn render_cancellable(
    background: &BackgroundImage,
    params: &ParameterVector,
    fonts: &FontRegistry,
    settings: &RenderSettings,
    cancel: &CancelToken,
) -> LogoResult<RenderResult> {
    if params.text.is_empty() {
        return Err(LogoError::render("nothing to render: text is empty"));
    }
    let face = fonts
        .get(&params.font)
        .ok_or_else(|| LogoError::render(format!("font '{}' is not registered", params.font)))?;

    let text = params.display_text();
    let (width, height) = (background.width(), background.height());
    let pad = settings.fit_padding.saturating_mul(2);
    let fit = fit_text_cancellable(
        face.as_ref(),
        &text,
        width.saturating_sub(pad),
        height.saturating_sub(pad),
        settings.fit,
        cancel,
    )?;
    let font_size = fit.scaled(params.scale);
    tracing::debug!(fitted = fit.size, fits = fit.fits, font_size, "resolved font size");

    cancel.check()?;
    let mask = face.rasterize(&text, font_size)?;
    let text_box = TextBox {
        x: (i64::from(width) - i64::from(mask.width)).div_euclid(2) + i64::from(params.offset.dx),
        y: (i64::from(height) - i64::from(mask.height)).div_euclid(2)
            + i64::from(params.offset.dy),
        width: mask.width,
        height: mask.height,
    };

    let mut pixels = composite(&CompositeInput {
        background: background.premul_bytes(),
        width,
        height,
        mask: &mask,
        origin: (text_box.x, text_box.y),
        color: params.color,
        style: params.effect,
        blur_radius: params.blur_radius,
        jitter_seed: params.jitter_seed(),
        opts: settings.effects,
        cancel,
    })?;
    cancel.check()?;
    unpremultiply_rgba8_in_place(&mut pixels);

    let image = image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| LogoError::render("composited buffer does not match canvas size"))?;
    Ok(RenderResult {
        image,
        layout: LayoutMetrics {
            fitted_font_size: fit.size,
            fitted: fit.fits,
            font_size,
            text_box,
        },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
