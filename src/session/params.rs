use std::borrow::Cow;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::effects::style::EffectStyle;
use crate::foundation::core::{Offset, Rgba8};
use crate::foundation::error::{LogoError, LogoResult, Rejection};
use crate::text::registry::{FontId, FontRegistry};
use crate::text::symbols::DECORATION_SYMBOLS;

/// Zoom step used by the `bigger` / `smaller` shorthands.
pub const SCALE_STEP: f32 = 1.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Every user-adjustable rendering parameter of one session.
///
/// This is the only mutable session state besides the phase; renders are a pure function of
/// the background and this vector.
pub struct ParameterVector {
    /// Text to draw; empty until the session leaves `AwaitingText`.
    pub text: String,
    /// Anchor offset from the centered position.
    pub offset: Offset,
    /// Cumulative zoom applied after fitting, always `> 0`.
    pub scale: f32,
    /// Text color.
    pub color: Rgba8,
    /// Font face key.
    pub font: FontId,
    /// Background blur radius, always `>= 0`.
    pub blur_radius: f32,
    /// Effect drawn beneath the glyphs.
    pub effect: EffectStyle,
    /// Symbol framing the text on both sides, if any.
    #[serde(default)]
    pub decoration: Option<char>,
    /// Seed of the brushstroke jitter and decoration streams.
    pub seed: u64,
}

impl ParameterVector {
    /// Defaults installed when the background arrives.
    pub fn initial(font: FontId, color: Rgba8, seed: u64) -> Self {
        Self {
            text: String::new(),
            offset: Offset::default(),
            scale: 1.0,
            color,
            font,
            blur_radius: 0.0,
            effect: EffectStyle::None,
            decoration: None,
            seed,
        }
    }

    /// Seed for the jitter stream of this text.
    pub fn jitter_seed(&self) -> u64 {
        self.seed ^ xxhash_rust::xxh3::xxh3_64(self.text.as_bytes())
    }

    /// Text as drawn: `"{symbol} {text} {symbol}"` when decorated.
    pub fn display_text(&self) -> Cow<'_, str> {
        match self.decoration {
            Some(symbol) => Cow::Owned(format!("{symbol} {} {symbol}", self.text)),
            None => Cow::Borrowed(&self.text),
        }
    }

    /// Symbol a random `Decorate` would pick next.
    ///
    /// Drawn from [`DECORATION_SYMBOLS`] by a ChaCha8 stream keyed on the jitter seed and the
    /// current symbol, so the pick is a pure function of the vector and never repeats the
    /// current symbol.
    pub fn next_decoration(&self) -> char {
        let current = self.decoration.map_or(0, |c| u64::from(u32::from(c)));
        let mut rng = ChaCha8Rng::seed_from_u64(self.jitter_seed() ^ current.rotate_left(32));
        let choices: Vec<char> = DECORATION_SYMBOLS
            .iter()
            .copied()
            .filter(|&c| Some(c) != self.decoration)
            .collect();
        choices[rng.gen_range(0..choices.len())]
    }

    /// Candidate vector after `cmd`. `self` is left untouched so a failed render can discard it.
    pub fn apply(
        &self,
        cmd: &Command,
        limits: &ParamLimits,
        fonts: &FontRegistry,
    ) -> LogoResult<Self> {
        let mut next = self.clone();
        match cmd {
            Command::Move { dx, dy } => next.offset = self.offset.saturating_add(*dx, *dy),
            Command::Scale { factor } => {
                if !factor.is_finite() || *factor <= 0.0 {
                    return Err(Rejection::InvalidArgument(format!(
                        "scale factor must be finite and > 0, got {factor}"
                    ))
                    .into());
                }
                next.scale = (self.scale * factor).clamp(limits.min_scale, limits.max_scale);
            }
            Command::SetColor { rgba } => next.color = *rgba,
            Command::SetFont { font } => {
                if !fonts.contains(font) {
                    return Err(Rejection::UnknownFont(font.to_string()).into());
                }
                next.font = font.clone();
            }
            Command::SetBlur { radius } => {
                if !radius.is_finite() || *radius < 0.0 {
                    return Err(Rejection::InvalidArgument(format!(
                        "blur radius must be finite and >= 0, got {radius}"
                    ))
                    .into());
                }
                next.blur_radius = radius.min(limits.max_blur_radius);
            }
            Command::SetEffect { style } => next.effect = *style,
            Command::Decorate { symbol } => {
                next.decoration = Some(match symbol {
                    Some(c) if c.is_whitespace() || c.is_control() => {
                        return Err(Rejection::InvalidArgument(format!(
                            "decoration must be a visible character, got {c:?}"
                        ))
                        .into());
                    }
                    Some(c) => *c,
                    None => self.next_decoration(),
                });
            }
            Command::ClearDecoration => next.decoration = None,
        }
        Ok(next)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
/// Clamp range for scale and blur.
pub struct ParamLimits {
    /// Scale floor.
    pub min_scale: f32,
    /// Scale ceiling.
    pub max_scale: f32,
    /// Blur radius ceiling.
    pub max_blur_radius: f32,
}

impl Default for ParamLimits {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 8.0,
            max_blur_radius: 40.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// What text a session accepts.
pub struct TextRules {
    /// Maximum length in characters, after trimming.
    pub max_chars: usize,
    /// Accept only letters, digits and spaces.
    pub alphanumeric_only: bool,
}

impl Default for TextRules {
    fn default() -> Self {
        Self {
            max_chars: 64,
            alphanumeric_only: false,
        }
    }
}

impl TextRules {
    /// Trim `text` and check it.
    pub fn check<'t>(&self, text: &'t str) -> LogoResult<&'t str> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejection::EmptyText.into());
        }
        if text.chars().count() > self.max_chars {
            return Err(Rejection::TextTooLong {
                max: self.max_chars,
            }
            .into());
        }
        if self.alphanumeric_only && !text.chars().all(|c| c == ' ' || c.is_alphanumeric()) {
            return Err(Rejection::InvalidCharacters.into());
        }
        Ok(text)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
/// One adjustment; each changes exactly one field of the [`ParameterVector`].
pub enum Command {
    /// Shift the anchor by `(dx, dy)` pixels.
    Move {
        /// Horizontal shift.
        dx: i32,
        /// Vertical shift.
        dy: i32,
    },
    /// Multiply the current scale by `factor` (clamped to the configured range).
    Scale {
        /// Multiplier, `> 0`.
        factor: f32,
    },
    /// Replace the text color.
    SetColor {
        /// New color.
        rgba: Rgba8,
    },
    /// Switch font face.
    SetFont {
        /// Registered font id.
        font: FontId,
    },
    /// Set the background blur radius.
    SetBlur {
        /// New radius, `>= 0`.
        radius: f32,
    },
    /// Switch the effect drawn beneath the glyphs.
    SetEffect {
        /// New style.
        style: EffectStyle,
    },
    /// Frame the text with a symbol on each side.
    Decorate {
        /// Symbol to use; `None` picks the next one from the session's decoration stream.
        #[serde(default)]
        symbol: Option<char>,
    },
    /// Remove the framing symbols.
    ClearDecoration,
}

impl Command {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Scale { .. } => "scale",
            Self::SetColor { .. } => "color",
            Self::SetFont { .. } => "font",
            Self::SetBlur { .. } => "blur",
            Self::SetEffect { .. } => "effect",
            Self::Decorate { .. } => "decorate",
            Self::ClearDecoration => "undecorate",
        }
    }
}

impl FromStr for Command {
    type Err = LogoError;

    /// Parse button-style commands such as `move 10 -5`, `left 20`, `scale 1.1`, `bigger`,
    /// `color #ff8800`, `font mono`, `blur 3`, `effect glow`, `decorate ❤`, `decorate` or
    /// `undecorate`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| LogoError::validation("empty command"))?
            .to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        let arity = |n: usize| -> LogoResult<()> {
            if args.len() != n {
                return Err(LogoError::validation(format!(
                    "'{verb}' expects {n} argument(s), got {}",
                    args.len()
                )));
            }
            Ok(())
        };
        let int = |v: &str| -> LogoResult<i32> {
            v.parse()
                .map_err(|_| LogoError::validation(format!("'{v}' is not an integer")))
        };
        let float = |v: &str| -> LogoResult<f32> {
            v.parse()
                .map_err(|_| LogoError::validation(format!("'{v}' is not a number")))
        };

        let cmd = match verb.as_str() {
            "move" => {
                arity(2)?;
                Self::Move {
                    dx: int(args[0])?,
                    dy: int(args[1])?,
                }
            }
            "left" | "right" | "up" | "down" => {
                arity(1)?;
                let n = int(args[0])?;
                let (dx, dy) = match verb.as_str() {
                    "left" => (n.saturating_neg(), 0),
                    "right" => (n, 0),
                    "up" => (0, n.saturating_neg()),
                    _ => (0, n),
                };
                Self::Move { dx, dy }
            }
            "scale" | "zoom" => {
                arity(1)?;
                Self::Scale {
                    factor: float(args[0])?,
                }
            }
            "bigger" => {
                arity(0)?;
                Self::Scale {
                    factor: SCALE_STEP,
                }
            }
            "smaller" => {
                arity(0)?;
                Self::Scale {
                    factor: 1.0 / SCALE_STEP,
                }
            }
            "color" | "colour" => {
                arity(1)?;
                Self::SetColor {
                    rgba: args[0].parse()?,
                }
            }
            "font" => {
                arity(1)?;
                Self::SetFont {
                    font: FontId::new(args[0]),
                }
            }
            "blur" => {
                arity(1)?;
                Self::SetBlur {
                    radius: float(args[0])?,
                }
            }
            "effect" | "style" => {
                arity(1)?;
                Self::SetEffect {
                    style: args[0].parse()?,
                }
            }
            "decorate" => match args.as_slice() {
                [] | ["random"] => Self::Decorate { symbol: None },
                ["none" | "off"] => Self::ClearDecoration,
                [arg] => {
                    let mut chars = arg.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Self::Decorate { symbol: Some(c) },
                        _ => {
                            return Err(LogoError::validation(format!(
                                "'decorate' expects a single symbol, got '{arg}'"
                            )));
                        }
                    }
                }
                _ => {
                    return Err(LogoError::validation(format!(
                        "'decorate' expects at most 1 argument(s), got {}",
                        args.len()
                    )));
                }
            },
            "undecorate" => {
                arity(0)?;
                Self::ClearDecoration
            }
            other => {
                return Err(LogoError::validation(format!("unknown command '{other}'")));
            }
        };
        Ok(cmd)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/params.rs"]
mod tests;
