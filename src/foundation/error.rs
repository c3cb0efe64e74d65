/// Convenience result type used across the crate.
pub type LogoResult<T> = Result<T, LogoError>;

/// Reason a command was refused without touching session state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No session exists for the key (no image has been received yet).
    #[error("no session")]
    NoSession,
    /// The session already has its text.
    #[error("text already set")]
    TextAlreadySet,
    /// Text was empty after trimming.
    #[error("empty text")]
    EmptyText,
    /// Text contains something other than letters, digits and spaces while that rule is on.
    #[error("text may only contain letters, digits and spaces")]
    InvalidCharacters,
    /// Text exceeds the configured character limit.
    #[error("text longer than {max} characters")]
    TextTooLong {
        /// Configured limit.
        max: usize,
    },
    /// The session was finalized; only "start over" is possible.
    #[error("session closed")]
    SessionClosed,
    /// A render for this session is in flight and the engine is configured not to queue.
    #[error("busy")]
    Busy,
    /// Image payload exceeds the configured byte limit.
    #[error("image payload of {size} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge {
        /// Payload size.
        size: usize,
        /// Configured limit.
        max: usize,
    },
    /// Decoded image exceeds the configured pixel limit.
    #[error("image of {width}x{height} exceeds pixel limit")]
    ImageTooLarge {
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
    },
    /// The command is not valid in the session's current phase.
    #[error("not accepted while {0}")]
    InvalidForPhase(&'static str),
    /// The requested font is not registered.
    #[error("unknown font '{0}'")]
    UnknownFont(String),
    /// A command argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(thiserror::Error, Debug)]
/// Error type for the composition engine.
pub enum LogoError {
    /// Input refused; the session is unchanged.
    #[error("input rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Image or font bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Rendering failed; retrying the same command is safe.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid configuration or internal argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LogoError {
    /// Build a [`LogoError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`LogoError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`LogoError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns the rejection reason if this is an input rejection.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }

    /// Render failures are transient: the identical command may be resubmitted.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
