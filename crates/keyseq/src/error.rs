//! Crate-wide error type.
//!
//! One variant per error kind named in the design: task failure is carried by
//! the task's own future rather than this enum, so what remains here is
//! purely the library-misuse and lifecycle surface.

use thiserror::Error;

/// Errors surfaced by a [`crate::Executor`] or [`crate::Factory`].
///
/// Task failures are *not* represented here: a failing task's own error is
/// delivered through the `Future` returned by `submit`, preserving the
/// caller's original error type. This enum only covers the outer control
/// surface.
#[derive(Debug, Error)]
pub enum KeyseqError {
    /// Raised by `shutdown`/`shutdown_now` on a per-key handle. The shared
    /// dispatcher pool may be carrying work for unrelated keys, so a single
    /// handle is never allowed to tear it down.
    #[error("shutdown is not supported on a per-key executor handle")]
    Unsupported,

    /// The executor (or the factory that minted it) has already been closed.
    #[error("executor has been shut down")]
    ExecutorShutdown,

    /// A task panicked instead of returning normally.
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// A bulk operation (`invoke_all`/`invoke_any`) was called with an empty
    /// task list, or a submission was otherwise malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// `invoke_any` exhausted every task without a single success.
    #[error("invoke_any: all {0} tasks failed")]
    AllFailed(usize),

    /// The dispatcher's underlying `tokio` runtime failed to build, surfaced
    /// from `Factory::new`/`Factory::with_config`.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type KeyseqResult<T> = Result<T, KeyseqError>;
