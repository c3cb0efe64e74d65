use crate::foundation::error::{LogoError, LogoResult};
use crate::foundation::math::mul_div255_u8;

pub(crate) type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over for premultiplied pixels.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Scale a premultiplied pixel by an 8-bit coverage value.
pub(crate) fn with_coverage(px: PremulRgba8, coverage: u8) -> PremulRgba8 {
    match coverage {
        0 => [0; 4],
        255 => px,
        c => px.map(|v| mul_div255_u8(u16::from(v), u16::from(c))),
    }
}

/// Composite `src` over `dst`, both premultiplied RGBA8 of equal length.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> LogoResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(LogoError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Paint `color` (premultiplied) through a canvas-sized coverage layer onto `dst`.
pub(crate) fn paint_coverage_in_place(
    dst: &mut [u8],
    coverage: &[u8],
    color: PremulRgba8,
) -> LogoResult<()> {
    if dst.len() != coverage.len() * 4 {
        return Err(LogoError::render(
            "paint_coverage_in_place expects one coverage byte per rgba8 pixel",
        ));
    }
    for (d, &c) in dst.chunks_exact_mut(4).zip(coverage) {
        if c == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], with_coverage(color, c));
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
