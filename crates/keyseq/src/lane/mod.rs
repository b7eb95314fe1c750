//! Lane and lane registry (§3 "Lane"/"Lane registry", §4.1–§4.3).
//!
//! The two strategies from §4.1 and §4.2 share one contract (§9 "dynamic
//! dispatch over the strategy choice"): `append` takes a key and a task
//! thunk and reports only whether the task was handed to the dispatcher —
//! the caller already holds its own future via the oneshot embedded in the
//! thunk by [`crate::task::envelope`], so a successful `append` carries no
//! payload, and a failed one means the task was dropped unrun (the caller's
//! own future observes that through the dropped oneshot).

pub(crate) mod chained;
pub(crate) mod pooled;

use crate::error::KeyseqResult;
use crate::key::Slot;

/// Common contract implemented by both lane strategies.
///
/// Selected once at factory construction and held behind a trait object so
/// the rest of the crate (`Executor`, `Factory`) never needs to know which
/// strategy is in play.
pub(crate) trait LaneStrategy<K>: Send + Sync {
    /// Appends `task` to the lane for `key`. Fails with
    /// [`crate::error::KeyseqError::ExecutorShutdown`], without running
    /// `task`, if the dispatcher closed before the task could be scheduled
    /// (the race `ExecutorCore::append`'s own shutdown check can narrow but
    /// not close).
    fn append(&self, key: Slot<K>, task: crate::task::TaskThunk) -> KeyseqResult<()>;

    /// Current number of active lanes. Drives `Factory::lane_count` (§3.1)
    /// and testable property 4 ("no lane leak").
    fn lane_count(&self) -> usize;
}
