//! Pooled-worker lane strategy (§4.2).
//!
//! Each lane borrows a single-threaded worker (its own FIFO queue, realized
//! as an unbounded `mpsc` channel drained one job at a time by a dedicated
//! background task) from a shared object pool; the registry stores the
//! active worker. A worker is returned to the pool only once its pending
//! count reaches zero, so "queue empty on return" (§4.2 invariant) holds by
//! construction.

use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::mpsc;

use crate::dispatcher::Dispatcher;
use crate::error::{KeyseqError, KeyseqResult};
use crate::key::Slot;
use crate::lane::LaneStrategy;
use crate::task::{TaskOutcome, TaskThunk};

/// One queued unit of work. `key_display` and `span` travel with the job
/// (rather than living on the worker) because a single worker serves many
/// keys over its lifetime — the lane identity belongs to the task, not to
/// whichever worker happens to be draining it this time.
struct Job {
    thunk: TaskThunk,
    after: Box<dyn FnOnce() + Send>,
    key_display: String,
    span: tracing::Span,
}

pub(crate) struct Worker {
    sender: mpsc::UnboundedSender<Job>,
    pending: AtomicUsize,
}

/// Spawns a worker's background drain loop. Returns `None`, without handing
/// back a usable worker, if the dispatcher has already closed — the drain
/// loop future would otherwise be dropped unrun and the worker would be
/// dead on arrival.
fn spawn_worker(dispatcher: &Dispatcher) -> Option<Arc<Worker>> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
    let worker = Arc::new(Worker {
        sender,
        pending: AtomicUsize::new(0),
    });

    let spawned = dispatcher.spawn(async move {
        use tracing::Instrument;
        while let Some(job) = receiver.recv().await {
            let Job {
                thunk,
                after,
                key_display,
                span,
            } = job;
            async move {
                let outcome = thunk().await;
                if let TaskOutcome::Failed(reason) = &outcome {
                    tracing::warn!(
                        target: "keyseq::lane",
                        key = %key_display,
                        reason = %reason,
                        "task failed on pooled worker; lane continues"
                    );
                }
                after();
            }
            .instrument(span)
            .await;
        }
    });

    spawned.map(|_| worker)
}

/// Free list of idle workers, keyed by nothing: workers are interchangeable
/// (§4.2 "workers are interchangeable").
struct WorkerPool {
    idle: SyncMutex<Vec<Arc<Worker>>>,
    dispatcher: Arc<Dispatcher>,
}

impl WorkerPool {
    /// Returns `None` iff a fresh worker was needed and the dispatcher has
    /// already closed.
    fn acquire(&self) -> Option<Arc<Worker>> {
        if let Some(worker) = self.idle.lock().pop() {
            return Some(worker);
        }
        spawn_worker(&self.dispatcher)
    }

    fn release(&self, worker: Arc<Worker>) {
        self.idle.lock().push(worker);
    }
}

pub(crate) struct PooledRegistry<K> {
    map: Arc<DashMap<Slot<K>, Arc<Worker>>>,
    pool: Arc<WorkerPool>,
}

impl<K> PooledRegistry<K>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            pool: Arc::new(WorkerPool {
                idle: SyncMutex::new(Vec::new()),
                dispatcher,
            }),
        }
    }
}

/// Runs the §4.3 sweep for the pooled-worker strategy inside a fresh atomic
/// registry update: removes the entry and returns the worker to the pool iff
/// the stored worker is still `worker` and its pending-task counter is
/// exactly zero. The counter is exact, not approximate, precisely because
/// both this read and every increment in `append` happen inside the same
/// per-key `DashMap::entry` critical section.
fn sweep<K>(
    map: &DashMap<Slot<K>, Arc<Worker>>,
    pool: &WorkerPool,
    slot: Slot<K>,
    worker: &Arc<Worker>,
) where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    if let Entry::Occupied(occupied) = map.entry(slot) {
        if Arc::ptr_eq(occupied.get(), worker) && worker.pending.load(Ordering::Acquire) == 0 {
            let worker = occupied.remove();
            pool.release(worker);
        }
    }
}

impl<K> LaneStrategy<K> for PooledRegistry<K>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn append(&self, slot: Slot<K>, task: TaskThunk) -> KeyseqResult<()> {
        let key_display = format!("{slot:?}");
        let span = tracing::info_span!(target: "keyseq::lane", "lane.task", key = %key_display);

        let worker = match self.map.entry(slot.clone()) {
            Entry::Occupied(occupied) => {
                occupied.get().pending.fetch_add(1, Ordering::AcqRel);
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => {
                // `pool.acquire()` only ever spawns when no idle worker is
                // available; a `None` here means the dispatcher closed
                // before this fresh worker's drain loop could be scheduled.
                // Nothing was inserted into `map` yet, so there's no entry
                // to clean up — just report the race the same way the
                // chained strategy does.
                let worker = self.pool.acquire().ok_or(KeyseqError::ExecutorShutdown)?;
                worker.pending.fetch_add(1, Ordering::AcqRel);
                vacant.insert(worker.clone());
                worker
            }
        };

        let map = self.map.clone();
        let pool = self.pool.clone();
        let worker_for_after = worker.clone();
        let slot_for_after = slot.clone();
        let after = Box::new(move || {
            worker_for_after.pending.fetch_sub(1, Ordering::AcqRel);
            sweep(&map, &pool, slot_for_after, &worker_for_after);
        });

        if worker
            .sender
            .send(Job {
                thunk: task,
                after,
                key_display,
                span,
            })
            .is_err()
        {
            // The worker's background task is gone (it can only exit if it
            // panicked — `recv` loops until the channel closes, which only
            // happens when every sender, including this pool's own clone
            // tracking, is dropped). Nothing queued will ever run; log and
            // leave the stale entry for the next append to replace the
            // worker, same as the §7 resource-pool error path.
            tracing::warn!(
                target: "keyseq::lane",
                key = ?slot,
                "pooled worker unavailable; task dropped"
            );
        }

        Ok(())
    }

    fn lane_count(&self) -> usize {
        self.map.len()
    }
}
