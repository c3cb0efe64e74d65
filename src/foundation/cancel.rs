use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{LogoError, LogoResult};

/// Shared stop flag polled by long pixel loops.
///
/// The engine raises it when a render outlives its deadline; the worker notices at the next
/// check and unwinds with [`LogoError::Render`].
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Render("cancelled"))` once cancelled.
    pub fn check(&self) -> LogoResult<()> {
        if self.is_cancelled() {
            return Err(LogoError::render("cancelled"));
        }
        Ok(())
    }

    /// Guard that cancels this token when dropped.
    pub(crate) fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

/// Raises its token on drop, e.g. when the future awaiting a render is dropped.
#[derive(Debug)]
pub(crate) struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/cancel.rs"]
mod tests;
