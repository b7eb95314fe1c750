//! Shutdown adapter (§4.5, ~5% share).
//!
//! Wraps an executor-like handle and forwards every operation except the
//! shutdown family, which it unconditionally rejects. Rationale carried over
//! verbatim from the design: the shared dispatcher pool may be running tasks
//! for unrelated keys, so a per-handle shutdown would wrongly cancel them.

use crate::error::{KeyseqError, KeyseqResult};

/// Forwards everything to `inner` except `shutdown`/`shutdown_now`.
///
/// This is deliberately a thin, generic wrapper rather than folded directly
/// into [`crate::executor::Executor`]: keeping it a distinct type documents,
/// in the type system, that the rejection is structural rather than an
/// implementation detail a future refactor might accidentally drop.
pub(crate) struct ShutdownGuard<E> {
    inner: E,
}

impl<E> ShutdownGuard<E> {
    pub(crate) fn new(inner: E) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &E {
        &self.inner
    }

    /// Always fails with [`KeyseqError::Unsupported`] (§7 "unsupported
    /// lifecycle"); never touches `inner`.
    pub(crate) fn shutdown(&self) -> KeyseqResult<()> {
        Err(KeyseqError::Unsupported)
    }

    /// Same rejection as `shutdown`; there is no partial/"now" variant to
    /// fall back to.
    pub(crate) fn shutdown_now(&self) -> KeyseqResult<Vec<()>> {
        Err(KeyseqError::Unsupported)
    }
}
