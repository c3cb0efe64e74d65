use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{LogoError, LogoResult};

/// Q16 Gaussian taps for a user-facing blur radius.
///
/// `ceil(r)` taps on each side of the center, sigma `r / 2` (at least 0.5). The taps sum to
/// exactly 65536 so flat regions of the background stay flat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BlurKernel {
    taps: Vec<u32>,
}

impl BlurKernel {
    /// `None` when the radius is zero, negative or not finite: the background is used as is.
    pub(crate) fn for_radius(blur_radius: f32) -> Option<Self> {
        if !blur_radius.is_finite() || blur_radius <= 0.0 {
            return None;
        }
        let reach = blur_radius.ceil() as i32;
        let sigma = f64::from((blur_radius / 2.0).max(0.5));
        let denom = 2.0 * sigma * sigma;

        let raw: Vec<f64> = (-reach..=reach)
            .map(|i| (-f64::from(i * i) / denom).exp())
            .collect();
        let total: f64 = raw.iter().sum();
        let mut taps: Vec<u32> = raw
            .iter()
            .map(|w| ((w / total) * 65536.0).round() as u32)
            .collect();
        let sum: i64 = taps.iter().map(|&t| i64::from(t)).sum();
        let center = taps.len() / 2;
        taps[center] = (i64::from(taps[center]) + 65536 - sum).clamp(0, 65536) as u32;
        Some(Self { taps })
    }

    /// Taps on each side of the center.
    pub(crate) fn reach(&self) -> usize {
        self.taps.len() / 2
    }

    pub(crate) fn taps(&self) -> &[u32] {
        &self.taps
    }
}

/// Write the blurred `background` into `canvas`; both are premultiplied RGBA8 `width x height`.
///
/// Rows are blurred horizontally into a 8.8 fixed-point scratch plane, then each canvas row is
/// resolved vertically from it. Edges clamp. `cancel` is polled once per row of each pass.
pub(crate) fn blur_background_into(
    canvas: &mut [u8],
    background: &[u8],
    width: u32,
    height: u32,
    kernel: &BlurKernel,
    cancel: &CancelToken,
) -> LogoResult<()> {
    let row_len = (width as usize)
        .checked_mul(4)
        .ok_or_else(|| LogoError::render("blur row size overflow"))?;
    let len = row_len
        .checked_mul(height as usize)
        .ok_or_else(|| LogoError::render("blur buffer size overflow"))?;
    if background.len() != len || canvas.len() != len {
        return Err(LogoError::render(
            "blur expects background and canvas of width*height*4 bytes",
        ));
    }
    if len == 0 {
        return Ok(());
    }

    let taps = kernel.taps();
    let reach = kernel.reach() as i64;
    let (w, h) = (i64::from(width), i64::from(height));

    let mut scratch = vec![0u16; len];
    for (src_row, mid_row) in background
        .chunks_exact(row_len)
        .zip(scratch.chunks_exact_mut(row_len))
    {
        cancel.check()?;
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (t, &weight) in taps.iter().enumerate() {
                let sx = (x + t as i64 - reach).clamp(0, w - 1) as usize * 4;
                for (a, &v) in acc.iter_mut().zip(&src_row[sx..sx + 4]) {
                    *a += u64::from(weight) * u64::from(v);
                }
            }
            let dx = x as usize * 4;
            for (m, a) in mid_row[dx..dx + 4].iter_mut().zip(acc) {
                *m = ((a + 128) >> 8).min(u64::from(u16::MAX)) as u16;
            }
        }
    }

    for (y, out_row) in canvas.chunks_exact_mut(row_len).enumerate() {
        cancel.check()?;
        let rows: Vec<&[u16]> = (0..taps.len() as i64)
            .map(|t| {
                let sy = (y as i64 + t - reach).clamp(0, h - 1) as usize;
                &scratch[sy * row_len..(sy + 1) * row_len]
            })
            .collect();
        for (i, out) in out_row.iter_mut().enumerate() {
            let acc: u64 = rows
                .iter()
                .zip(taps)
                .map(|(row, &weight)| u64::from(weight) * u64::from(row[i]))
                .sum();
            *out = ((acc + (1 << 23)) >> 24).min(255) as u8;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
