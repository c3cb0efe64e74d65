use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::decode::DecodeLimits;
use crate::effects::style::EffectOpts;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{LogoError, LogoResult};
use crate::render::export::ExportOpts;
use crate::render::pipeline::RenderSettings;
use crate::session::params::{ParamLimits, TextRules};
use crate::text::fit::FitPolicy;
use crate::text::registry::FontId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Engine-wide configuration. Every field has a default, so a partial JSON file is enough.
pub struct EngineConfig {
    /// Maximum encoded image upload size in bytes.
    pub max_image_bytes: usize,
    /// Maximum decoded `width * height`.
    pub max_image_pixels: u64,
    /// Maximum text length in characters, after trimming.
    pub max_text_chars: usize,
    /// Refuse text with anything but letters, digits and spaces.
    pub alphanumeric_text: bool,
    /// Render worker threads. `None` uses rayon's default.
    pub render_threads: Option<usize>,
    /// Per-render deadline in milliseconds.
    pub render_timeout_ms: u64,
    /// Refuse commands with `Busy` while a render for the same session is running, instead of
    /// queueing them.
    pub reject_when_busy: bool,
    /// Directory of `.ttf`/`.otf`/`.ttc` files to register at startup.
    pub fonts_dir: Option<PathBuf>,
    /// Font installed when a background arrives.
    pub default_font: FontId,
    /// Text color installed when a background arrives.
    pub default_color: Rgba8,
    /// Font-fit search.
    pub fit: FitPolicy,
    /// Inset of the fit box from each canvas edge, in pixels.
    pub fit_padding: u32,
    /// Scale floor.
    pub min_scale: f32,
    /// Scale ceiling.
    pub max_scale: f32,
    /// Blur radius ceiling.
    pub max_blur_radius: f32,
    /// Effect tunables.
    pub effects: EffectOpts,
    /// Finalize encoding.
    pub export: ExportOpts,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let limits = ParamLimits::default();
        Self {
            max_image_bytes: 200 * 1024 * 1024,
            max_image_pixels: 64_000_000,
            max_text_chars: 64,
            alphanumeric_text: false,
            render_threads: None,
            render_timeout_ms: 10_000,
            reject_when_busy: false,
            fonts_dir: None,
            default_font: FontId::builtin(),
            default_color: Rgba8::WHITE,
            fit: FitPolicy::default(),
            fit_padding: 0,
            min_scale: limits.min_scale,
            max_scale: limits.max_scale,
            max_blur_radius: limits.max_blur_radius,
            effects: EffectOpts::default(),
            export: ExportOpts::default(),
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> LogoResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check ranges and cross-field constraints.
    pub fn validate(&self) -> LogoResult<()> {
        if self.max_image_bytes == 0 || self.max_image_pixels == 0 {
            return Err(LogoError::validation("image limits must be > 0"));
        }
        if self.max_text_chars == 0 {
            return Err(LogoError::validation("max_text_chars must be > 0"));
        }
        if self.render_threads == Some(0) {
            return Err(LogoError::validation("render_threads must be >= 1 when set"));
        }
        if self.render_timeout_ms == 0 {
            return Err(LogoError::validation("render_timeout_ms must be > 0"));
        }
        if !(self.min_scale.is_finite() && self.max_scale.is_finite())
            || self.min_scale <= 0.0
            || self.min_scale > 1.0
            || self.max_scale < 1.0
        {
            return Err(LogoError::validation(
                "scale range must satisfy 0 < min_scale <= 1 <= max_scale",
            ));
        }
        if !self.max_blur_radius.is_finite() || self.max_blur_radius < 0.0 {
            return Err(LogoError::validation("max_blur_radius must be finite and >= 0"));
        }
        if !(1..=100).contains(&self.export.jpeg_quality) {
            return Err(LogoError::validation("export.jpeg_quality must be in 1..=100"));
        }
        self.fit.validate()?;
        self.effects.validate()?;
        Ok(())
    }

    pub(crate) fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_bytes: self.max_image_bytes,
            max_pixels: self.max_image_pixels,
        }
    }

    pub(crate) fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            fit: self.fit,
            fit_padding: self.fit_padding,
            effects: self.effects,
        }
    }

    pub(crate) fn text_rules(&self) -> TextRules {
        TextRules {
            max_chars: self.max_text_chars,
            alphanumeric_only: self.alphanumeric_text,
        }
    }

    pub(crate) fn param_limits(&self) -> ParamLimits {
        ParamLimits {
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            max_blur_radius: self.max_blur_radius,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
