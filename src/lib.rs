//! Logoforge composes a user's text onto a user's image as a stylised logo.
//!
//! The public API is session-oriented and async:
//!
//! - Upload a background with [`Engine::submit_image`]
//! - Place text with [`Engine::submit_text`]
//! - Adjust with [`Engine::submit_adjustment`] ([`Command`]), one field at a time
//! - Export with [`Engine::finalize`]
//!
//! Every render recomputes the image from the untouched background and the session's
//! [`ParameterVector`], so identical inputs produce byte-identical output.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Engine configuration.
pub mod config;
pub(crate) mod effects;
/// Async session engine.
pub mod engine;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod text;

pub use crate::assets::decode::{BackgroundImage, BackgroundRef, DecodeLimits, decode_background};
pub use crate::config::EngineConfig;
pub use crate::effects::style::{EffectOpts, EffectStyle, MAX_GLOW_RADIUS};
pub use crate::engine::{Engine, SessionCreated, StyleVariant};
pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{Offset, Rgba8, TextBox};
pub use crate::foundation::error::{LogoError, LogoResult, Rejection};
pub use crate::render::export::{ExportFormat, ExportOpts, ExportedImage, export, flatten};
pub use crate::render::pipeline::{
    LayoutMetrics, RenderResult, RenderSettings, render, render_cancellable,
};
pub use crate::session::params::{Command, ParamLimits, ParameterVector, SCALE_STEP, TextRules};
pub use crate::session::state::{Phase, Session, SessionKey, SessionSnapshot};
pub use crate::session::store::{SessionHandle, SessionStore};
pub use crate::text::bitmap::BitmapFace;
pub use crate::text::face::{FontFace, GlyphMask, TextExtent};
pub use crate::text::fit::{FitPolicy, FitResult, fit_text};
pub use crate::text::outline::OutlineFace;
pub use crate::text::registry::{BUILTIN_FONT, FontId, FontRegistry};
pub use crate::text::symbols::DECORATION_SYMBOLS;
