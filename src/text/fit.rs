use serde::{Deserialize, Serialize};

use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{LogoError, LogoResult};
use crate::text::face::{FontFace, TextExtent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Candidate sizes searched by [`fit_text`], in points (1pt = 1px).
pub struct FitPolicy {
    /// First (largest) size tried.
    pub max_size: u32,
    /// Decrement between candidates.
    pub step: u32,
    /// Floor returned when nothing fits.
    pub min_size: u32,
}

impl Default for FitPolicy {
    fn default() -> Self {
        Self {
            max_size: 100,
            step: 5,
            min_size: 10,
        }
    }
}

impl FitPolicy {
    /// Reject policies that cannot produce a size.
    pub fn validate(&self) -> LogoResult<()> {
        if self.step == 0 {
            return Err(LogoError::validation("fit step must be >= 1"));
        }
        if self.min_size == 0 {
            return Err(LogoError::validation("fit min_size must be >= 1"));
        }
        if self.min_size > self.max_size {
            return Err(LogoError::validation("fit min_size must be <= max_size"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Outcome of the font-fit search.
pub struct FitResult {
    /// Resolved size before the session scale is applied.
    pub size: u32,
    /// Measured extent at `size`.
    pub extent: TextExtent,
    /// Whether `extent` fits the box (false only for the best-effort floor).
    pub fits: bool,
}

impl FitResult {
    /// Apply the user zoom factor. The result may exceed the fitted box on purpose.
    pub fn scaled(&self, scale: f32) -> f32 {
        self.size as f32 * scale
    }
}

/// Largest candidate size whose measured extent fits `box_width x box_height`.
///
/// Walks down from `policy.max_size` by `policy.step`; when no candidate at or above
/// `policy.min_size` fits, the floor is returned with `fits == false` rather than an error.
pub fn fit_text(
    face: &dyn FontFace,
    text: &str,
    box_width: u32,
    box_height: u32,
    policy: FitPolicy,
) -> LogoResult<FitResult> {
    fit_text_cancellable(face, text, box_width, box_height, policy, &CancelToken::new())
}

/// [`fit_text`] that gives up with `Render("cancelled")` between candidates once `cancel` fires.
pub(crate) fn fit_text_cancellable(
    face: &dyn FontFace,
    text: &str,
    box_width: u32,
    box_height: u32,
    policy: FitPolicy,
    cancel: &CancelToken,
) -> LogoResult<FitResult> {
    policy.validate()?;

    let mut size = policy.max_size;
    loop {
        cancel.check()?;
        let extent = face.measure(text, size as f32)?;
        if extent.fits(box_width, box_height) {
            return Ok(FitResult {
                size,
                extent,
                fits: true,
            });
        }
        match size.checked_sub(policy.step) {
            Some(next) if next >= policy.min_size => size = next,
            _ => break,
        }
    }

    let extent = face.measure(text, policy.min_size as f32)?;
    Ok(FitResult {
        size: policy.min_size,
        fits: extent.fits(box_width, box_height),
        extent,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/text/fit.rs"]
mod tests;
