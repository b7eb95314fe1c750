//! Task envelope (§3, §4 "Task envelope" / "~5% share").
//!
//! A lane only needs to know *that* a task finished and whether it succeeded,
//! never *what* it produced — the produced value is routed straight to the
//! caller's own future via a oneshot channel. Type-erasing the lane's view of
//! a task down to `FnOnce() -> Future<Output = TaskOutcome>` keeps the lane
//! and registry code free of a generic result-type parameter, the same
//! erase-then-downcast shape the teacher's executor contract uses for
//! `spawn_dyn`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;

use crate::error::KeyseqError;

/// The outcome a lane observes for one completed task. Carries no payload:
/// the payload already went to the caller through its own oneshot.
#[derive(Debug, Clone)]
pub(crate) enum TaskOutcome {
    Ok,
    Failed(String),
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Ok => write!(f, "ok"),
            TaskOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

pub(crate) type UnitFuture = Pin<Box<dyn Future<Output = TaskOutcome> + Send>>;

/// A lane-visible unit of work. Invoking it runs the caller's task exactly
/// once and reports back through whatever channel the caller's envelope
/// closed over; the lane never sees that channel.
pub(crate) type TaskThunk = Box<dyn FnOnce() -> UnitFuture + Send>;

/// Wraps a caller future `fut` (§3 "task envelope completes exactly once")
/// into a [`TaskThunk`], routing its result to `tx` and reporting a
/// [`TaskOutcome`] to the lane machinery.
///
/// `std::panic::AssertUnwindSafe` is not used: a panicking task aborts the
/// worker thread carrying it only insofar as `tokio` catches unwinds at the
/// task boundary already; we surface that here as a `TaskPanicked` error on
/// the caller's future instead of poisoning the lane.
pub(crate) fn envelope<F, T>(fut: F, tx: oneshot::Sender<Result<T, KeyseqError>>) -> TaskThunk
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    Box::new(move || -> UnitFuture {
        Box::pin(async move {
            let result = std::panic::AssertUnwindSafe(fut)
                .catch_unwind_checked()
                .await;
            match result {
                Ok(value) => {
                    let _ = tx.send(Ok(value));
                    TaskOutcome::Ok
                }
                Err(reason) => {
                    let _ = tx.send(Err(KeyseqError::TaskPanicked(reason.clone())));
                    TaskOutcome::Failed(reason)
                }
            }
        })
    })
}

/// A fire-and-forget task's envelope: the same chassis, but no result is
/// ever observed and no oneshot is involved.
pub(crate) fn fire_and_forget<F>(fut: F) -> TaskThunk
where
    F: Future<Output = ()> + Send + 'static,
{
    Box::new(move || -> UnitFuture {
        Box::pin(async move {
            match std::panic::AssertUnwindSafe(fut).catch_unwind_checked().await {
                Ok(()) => TaskOutcome::Ok,
                Err(reason) => TaskOutcome::Failed(reason),
            }
        })
    })
}

/// Small helper trait giving futures a `catch_unwind`-like combinator
/// without requiring the future to be `UnwindSafe` by construction (tasks
/// are arbitrary caller closures and frequently capture `&mut` state that
/// isn't, so we assert it ourselves at this single boundary).
trait CatchUnwindCheckedExt: Future + Sized {
    fn catch_unwind_checked(
        self,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Output, String>> + Send>>
    where
        Self: Send + 'static,
        Self::Output: Send + 'static;
}

impl<F> CatchUnwindCheckedExt for std::panic::AssertUnwindSafe<F>
where
    F: Future + Send + 'static,
{
    fn catch_unwind_checked(
        self,
    ) -> Pin<Box<dyn Future<Output = Result<F::Output, String>> + Send>>
    where
        F::Output: Send + 'static,
    {
        use futures::FutureExt;
        Box::pin(self.catch_unwind().map(|res| {
            res.map_err(|panic| {
                panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string())
            })
        }))
    }
}
