//! The caller-facing per-key handle (§6 "External interfaces").
//!
//! `Executor<K>` is always bound to a single key at construction
//! (`Factory::handle(key)`); every operation it exposes — `execute`,
//! `submit`, and every task folded into `invoke_all`/`invoke_any` — appends
//! to that key's lane and therefore serializes with it (§6.1, the resolved
//! Open Question on bulk-operation ordering).

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::select_ok;

use crate::error::{KeyseqError, KeyseqResult};
use crate::key::{Slot, SequenceKey};
use crate::lane::LaneStrategy;
use crate::serialize_gate::SerializeGate;
use crate::shutdown::ShutdownGuard;
use crate::task::{envelope, fire_and_forget};

/// Operations visible before the shutdown adapter is applied. Not public;
/// `Executor` is the only way callers reach this.
pub(crate) struct ExecutorCore<K> {
    slot: Slot<K>,
    strategy: Arc<dyn LaneStrategy<K>>,
    gate: Arc<SerializeGate>,
    factory_closed: Arc<AtomicBool>,
}

impl<K> ExecutorCore<K>
where
    K: SequenceKey,
{
    fn append(&self, thunk: crate::task::TaskThunk) -> KeyseqResult<()> {
        if self.factory_closed.load(Ordering::Acquire) {
            return Err(KeyseqError::ExecutorShutdown);
        }
        let _held = self.gate.enter();
        // Even past the check above, `Factory::close` may land on another
        // thread before the strategy reaches the dispatcher; the strategy
        // itself carries the authoritative shutdown check and reports it
        // here instead of panicking.
        self.strategy.append(self.slot.clone(), thunk)
    }

    fn is_shutdown(&self) -> bool {
        self.factory_closed.load(Ordering::Acquire)
    }

    fn is_terminated(&self) -> bool {
        // The dispatcher is shut down in lockstep with `factory_closed`; by
        // the time any handle observes `closed == true`, `Dispatcher::close`
        // has already returned, so there is no separate "draining" state to
        // model for this handle's purposes (S5: both flip together).
        self.is_shutdown()
    }
}

/// A stable handle bound to one sequence key, returned by
/// [`crate::Factory::handle`].
pub struct Executor<K> {
    core: ShutdownGuard<ExecutorCore<K>>,
}

impl<K> Executor<K>
where
    K: SequenceKey,
{
    pub(crate) fn new(
        slot: Slot<K>,
        strategy: Arc<dyn LaneStrategy<K>>,
        gate: Arc<SerializeGate>,
        factory_closed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            core: ShutdownGuard::new(ExecutorCore {
                slot,
                strategy,
                gate,
                factory_closed,
            }),
        }
    }

    /// Fire-and-forget submission of a side-effecting task (§6
    /// `Executor.execute`).
    pub fn execute<F>(&self, task: F) -> KeyseqResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.core.inner().append(fire_and_forget(task))
    }

    /// Submission with a result-bearing future (§6 `Executor.submit`).
    ///
    /// The returned future resolves once this key's lane reaches and runs
    /// the task; it never blocks waiting for the lane to be appended to.
    pub fn submit<F, T>(&self, task: F) -> KeyseqResult<impl Future<Output = KeyseqResult<T>>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.core.inner().append(envelope(task, tx))?;
        Ok(async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(KeyseqError::ExecutorShutdown),
            }
        })
    }

    /// Bulk submission; every task still serializes through this handle's
    /// key (§6.1). Returns one result per input task, in input order.
    pub async fn invoke_all<F, T>(&self, tasks: Vec<F>) -> KeyseqResult<Vec<KeyseqResult<T>>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if tasks.is_empty() {
            return Err(KeyseqError::InvalidArgument("invoke_all: empty task list"));
        }
        let futures = tasks
            .into_iter()
            .map(|task| self.submit(task))
            .collect::<KeyseqResult<Vec<_>>>()?;
        Ok(futures::future::join_all(futures).await)
    }

    /// Returns the first task to succeed; fails only if every task fails
    /// (§6 `Executor.invokeAny`).
    pub async fn invoke_any<F, T>(&self, tasks: Vec<F>) -> KeyseqResult<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if tasks.is_empty() {
            return Err(KeyseqError::InvalidArgument("invoke_any: empty task list"));
        }
        let count = tasks.len();
        let futures = tasks
            .into_iter()
            .map(|task| self.submit(task))
            .collect::<KeyseqResult<Vec<_>>>()?;
        match select_ok(futures.into_iter().map(Box::pin)).await {
            Ok((value, _remaining)) => Ok(value),
            Err(_) => Err(KeyseqError::AllFailed(count)),
        }
    }

    /// Always fails with `Unsupported` (§6 `Executor.shutdown`, property 6).
    pub fn shutdown(&self) -> KeyseqResult<()> {
        self.core.shutdown()
    }

    /// Always fails with `Unsupported` (§6 `Executor.shutdownNow`, property 6).
    pub fn shutdown_now(&self) -> KeyseqResult<Vec<()>> {
        self.core.shutdown_now()
    }

    /// True once the factory that minted this handle has been closed
    /// (property 7).
    pub fn is_shutdown(&self) -> bool {
        self.core.inner().is_shutdown()
    }

    /// Tracks `is_shutdown` (see [`ExecutorCore::is_terminated`]).
    pub fn is_terminated(&self) -> bool {
        self.core.inner().is_terminated()
    }
}
