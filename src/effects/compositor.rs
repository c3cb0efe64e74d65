use crate::effects::blur::{BlurKernel, blur_background_into};
use crate::effects::composite::{over_in_place, paint_coverage_in_place};
use crate::effects::style::{EffectOpts, EffectStyle, brush_offsets, glow_offsets, outline_offsets};
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{LogoError, LogoResult};
use crate::foundation::math::mul_div255_u8;
use crate::text::face::GlyphMask;

/// Everything the compositor needs for one frame. Borrowed, never mutated.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CompositeInput<'a> {
    /// Premultiplied RGBA8 background, `width * height * 4` bytes.
    pub(crate) background: &'a [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) mask: &'a GlyphMask,
    /// Top-left of the mask in canvas pixels; may lie off-canvas.
    pub(crate) origin: (i64, i64),
    pub(crate) color: Rgba8,
    pub(crate) style: EffectStyle,
    pub(crate) blur_radius: f32,
    pub(crate) jitter_seed: u64,
    pub(crate) opts: EffectOpts,
    /// Polled between stamps and blur rows.
    pub(crate) cancel: &'a CancelToken,
}

/// Build the finished premultiplied canvas.
///
/// Effects and glyphs are drawn into a transparent overlay, the background is blurred straight
/// into the canvas, then the overlay goes over it. Glyph pixels never pass through the blur.
pub(crate) fn composite(input: &CompositeInput<'_>) -> LogoResult<Vec<u8>> {
    let px_count = (input.width as usize)
        .checked_mul(input.height as usize)
        .ok_or_else(|| LogoError::render("canvas size overflow"))?;
    if input.background.len() != px_count * 4 {
        return Err(LogoError::render(
            "background expects width*height*4 premultiplied bytes",
        ));
    }

    let mut overlay = vec![0u8; px_count * 4];

    if let Some((offsets, color)) = effect_layer(input) {
        let mut coverage = vec![0u8; px_count];
        for &(dx, dy) in &offsets {
            input.cancel.check()?;
            stamp_max(
                &mut coverage,
                input.width,
                input.height,
                input.mask,
                (input.origin.0 + i64::from(dx), input.origin.1 + i64::from(dy)),
            );
        }
        paint_coverage_in_place(&mut overlay, &coverage, color.premul())?;
    }

    input.cancel.check()?;
    let mut glyphs = vec![0u8; px_count];
    stamp_max(
        &mut glyphs,
        input.width,
        input.height,
        input.mask,
        input.origin,
    );
    paint_coverage_in_place(&mut overlay, &glyphs, input.color.premul())?;

    let mut canvas = vec![0u8; px_count * 4];
    match BlurKernel::for_radius(input.blur_radius) {
        Some(kernel) => blur_background_into(
            &mut canvas,
            input.background,
            input.width,
            input.height,
            &kernel,
            input.cancel,
        )?,
        None => canvas.copy_from_slice(input.background),
    }
    input.cancel.check()?;
    over_in_place(&mut canvas, &overlay)?;
    Ok(canvas)
}

fn effect_layer(input: &CompositeInput<'_>) -> Option<(Vec<(i32, i32)>, Rgba8)> {
    let opts = &input.opts;
    let contrast = input.color.contrasting().with_alpha(input.color.a);
    match input.style {
        EffectStyle::None => None,
        EffectStyle::Outline => Some((outline_offsets(opts.outline_width), contrast)),
        EffectStyle::Glow => {
            let alpha = mul_div255_u8(u16::from(input.color.a), u16::from(opts.glow_alpha));
            Some((glow_offsets(opts.glow_radius), input.color.with_alpha(alpha)))
        }
        EffectStyle::Brushstroke => Some((
            brush_offsets(input.jitter_seed, opts.brush_copies, opts.brush_jitter),
            contrast,
        )),
    }
}

/// Max-combine `mask` into a canvas-sized coverage layer at `origin`, clipping to the canvas.
pub(crate) fn stamp_max(
    layer: &mut [u8],
    width: u32,
    height: u32,
    mask: &GlyphMask,
    origin: (i64, i64),
) {
    let (ox, oy) = origin;
    let (w, h) = (i64::from(width), i64::from(height));
    let (mw, mh) = (i64::from(mask.width), i64::from(mask.height));

    let x0 = (-ox).clamp(0, mw);
    let x1 = (w - ox).clamp(0, mw);
    if x0 >= x1 {
        return;
    }
    for my in 0..mh {
        let cy = oy + my;
        if cy < 0 || cy >= h {
            continue;
        }
        let src_row = &mask.coverage[(my * mw) as usize..((my + 1) * mw) as usize];
        let dst_start = (cy * w + ox + x0) as usize;
        let dst_row = &mut layer[dst_start..dst_start + (x1 - x0) as usize];
        for (d, &s) in dst_row.iter_mut().zip(&src_row[x0 as usize..x1 as usize]) {
            *d = (*d).max(s);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/compositor.rs"]
mod tests;
