use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::decode::{BackgroundImage, BackgroundRef};
use crate::foundation::error::{LogoResult, Rejection};
use crate::effects::style::EffectStyle;
use crate::session::params::{Command, ParamLimits, ParameterVector, TextRules};
use crate::text::registry::FontRegistry;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Opaque user/conversation key a session is stored under.
pub struct SessionKey(pub String);

impl SessionKey {
    /// Construct a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable per-key seed for the jitter stream.
    pub fn seed(&self) -> u64 {
        xxhash_rust::xxh3::xxh3_64(self.0.as_bytes())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SessionKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Lifecycle phase of a session.
pub enum Phase {
    /// Waiting for the background upload.
    #[default]
    AwaitingImage,
    /// Background stored, waiting for the text.
    AwaitingText,
    /// Text placed; adjustments and finalize are accepted.
    Adjusting,
    /// Exported; every further command is refused.
    Finalized,
}

impl Phase {
    /// Human-readable phase name used in rejections.
    pub fn describe(self) -> &'static str {
        match self {
            Self::AwaitingImage => "awaiting image",
            Self::AwaitingText => "awaiting text",
            Self::Adjusting => "adjusting",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Serializable view of a session: background reference, vector and phase.
pub struct SessionSnapshot {
    /// Reference to the stored background, if any.
    pub background: Option<BackgroundRef>,
    /// Current committed parameters.
    pub params: ParameterVector,
    /// Current phase.
    pub phase: Phase,
}

/// One user's editing session.
///
/// Every `prepare_*` method validates against the phase and returns a candidate vector without
/// mutating; [`Session::commit`] installs a candidate once its render succeeded.
#[derive(Clone, Debug)]
pub struct Session {
    key: SessionKey,
    phase: Phase,
    background: Option<Arc<BackgroundImage>>,
    params: ParameterVector,
}

impl Session {
    /// Fresh session in [`Phase::AwaitingImage`].
    pub fn new(key: SessionKey, params: ParameterVector) -> Self {
        Self {
            key,
            phase: Phase::AwaitingImage,
            background: None,
            params,
        }
    }

    /// Session key.
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Committed parameter vector.
    pub fn params(&self) -> &ParameterVector {
        &self.params
    }

    /// Stored background, shared with render workers.
    pub fn background(&self) -> Option<&Arc<BackgroundImage>> {
        self.background.as_ref()
    }

    /// Check that a background may still be uploaded.
    pub fn check_image(&self) -> LogoResult<()> {
        match self.phase {
            Phase::AwaitingImage => Ok(()),
            Phase::Finalized => Err(Rejection::SessionClosed.into()),
            other => Err(Rejection::InvalidForPhase(other.describe()).into()),
        }
    }

    /// Store the background and reset parameters to `defaults`.
    pub fn accept_image(
        &mut self,
        background: Arc<BackgroundImage>,
        defaults: ParameterVector,
    ) -> LogoResult<()> {
        self.check_image()?;
        self.background = Some(background);
        self.params = defaults;
        self.phase = Phase::AwaitingText;
        tracing::debug!(key = %self.key, "background stored");
        Ok(())
    }

    /// Candidate vector carrying the trimmed `text`.
    pub fn prepare_text(&self, text: &str, rules: &TextRules) -> LogoResult<ParameterVector> {
        match self.phase {
            Phase::AwaitingText => {}
            Phase::AwaitingImage => return Err(Rejection::NoSession.into()),
            Phase::Adjusting => return Err(Rejection::TextAlreadySet.into()),
            Phase::Finalized => return Err(Rejection::SessionClosed.into()),
        }
        let text = rules.check(text)?;
        Ok(ParameterVector {
            text: text.to_string(),
            ..self.params.clone()
        })
    }

    /// Candidate vector after `cmd`.
    pub fn prepare_adjustment(
        &self,
        cmd: &Command,
        limits: &ParamLimits,
        fonts: &FontRegistry,
    ) -> LogoResult<ParameterVector> {
        self.require_adjusting()?;
        self.params.apply(cmd, limits, fonts)
    }

    /// One candidate per effect style, everything else as committed. Nothing is installed.
    pub fn prepare_variants(&self, styles: &[EffectStyle]) -> LogoResult<Vec<ParameterVector>> {
        self.require_adjusting()?;
        Ok(styles
            .iter()
            .map(|&effect| ParameterVector {
                effect,
                ..self.params.clone()
            })
            .collect())
    }

    /// Check that the session may be finalized.
    pub fn prepare_finalize(&self) -> LogoResult<()> {
        self.require_adjusting()
    }

    fn require_adjusting(&self) -> LogoResult<()> {
        match self.phase {
            Phase::Adjusting => Ok(()),
            Phase::AwaitingImage => Err(Rejection::NoSession.into()),
            Phase::AwaitingText => {
                Err(Rejection::InvalidForPhase(Phase::AwaitingText.describe()).into())
            }
            Phase::Finalized => Err(Rejection::SessionClosed.into()),
        }
    }

    /// Install a rendered candidate. The first commit moves the session into `Adjusting`.
    pub fn commit(&mut self, params: ParameterVector) {
        self.params = params;
        if self.phase == Phase::AwaitingText {
            self.phase = Phase::Adjusting;
            tracing::debug!(key = %self.key, "text placed");
        }
    }

    /// Mark the session finalized.
    pub fn close(&mut self) {
        self.phase = Phase::Finalized;
        tracing::debug!(key = %self.key, "session finalized");
    }

    /// Serializable view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            background: self.background.as_ref().map(|bg| bg.reference()),
            params: self.params.clone(),
            phase: self.phase,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
