//! Chained-stage lane strategy (§4.1).
//!
//! Each lane is a chain of completion stages; the registry stores only the
//! tail. Grounded on the teacher's `DashMap::entry`-based compute-style
//! update in `spark-switch`'s `SessionManager` (occupied/vacant match, single
//! shard lock held for the whole critical section) and on its `ArcSwap`-style
//! hot-swap-pointer idiom (`spark-core::kernel::arc_swap`) adapted here to an
//! `Arc` swapped under the `DashMap` shard lock rather than a lock-free
//! pointer, since the swap already happens inside a single-writer critical
//! section and needs no additional atomicity.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Notify;

use crate::dispatcher::Dispatcher;
use crate::error::{KeyseqError, KeyseqResult};
use crate::key::Slot;
use crate::lane::LaneStrategy;
use crate::task::{TaskOutcome, TaskThunk};

/// The tail of one lane: a completion signal successors chain behind.
///
/// `done` and `notify` together implement a one-shot "predecessor finished"
/// handoff. Only ever one successor waits on a given `Tail` (the registry
/// hands out a predecessor's `Tail` to at most one new append, via
/// `mem::replace`), so `Notify::notify_one`'s stored-permit semantics are
/// exactly what's needed: a notification sent before the successor starts
/// waiting is not lost.
struct Tail {
    done: AtomicBool,
    notify: Notify,
}

impl Tail {
    fn fresh() -> Arc<Self> {
        Arc::new(Self {
            done: AtomicBool::new(false),
            notify: Notify::new(),
        })
    }

    fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    async fn wait_until_done(&self) {
        if self.done.load(Ordering::Acquire) {
            return;
        }
        self.notify.notified().await;
    }
}

pub(crate) struct ChainedRegistry<K> {
    map: Arc<DashMap<Slot<K>, Arc<Tail>>>,
    dispatcher: Arc<Dispatcher>,
}

impl<K> ChainedRegistry<K>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            dispatcher,
        }
    }

}

/// Removes `slot` from `map` iff it still maps to `tail` — i.e. iff no new
/// append interleaved since `tail` was created. Pointer equality stands in
/// for the "stored tail reports completion" check from §4.3: this function
/// is only ever invoked as the continuation of `tail`'s own task, after
/// `tail.mark_done()`, so if the registry still points at `tail` then `tail`
/// is, by construction, done.
fn sweep<K>(map: &DashMap<Slot<K>, Arc<Tail>>, slot: Slot<K>, tail: &Arc<Tail>)
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    if let Entry::Occupied(occupied) = map.entry(slot) {
        if Arc::ptr_eq(occupied.get(), tail) {
            occupied.remove();
        }
    }
}

impl<K> LaneStrategy<K> for ChainedRegistry<K>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn append(&self, slot: Slot<K>, task: TaskThunk) -> KeyseqResult<()> {
        let new_tail = Tail::fresh();
        let predecessor = match self.map.entry(slot.clone()) {
            Entry::Occupied(mut occupied) => {
                Some(std::mem::replace(occupied.get_mut(), new_tail.clone()))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(new_tail.clone());
                None
            }
        };

        let map = self.map.clone();
        let this_tail = new_tail.clone();
        let slot_for_task = slot.clone();
        let span = tracing::info_span!(target: "keyseq::lane", "lane.task", key = ?slot);

        let spawned = self.dispatcher.spawn(async move {
            use tracing::Instrument;
            async move {
                if let Some(pred) = predecessor {
                    pred.wait_until_done().await;
                }
                let outcome = task().await;
                if let TaskOutcome::Failed(reason) = &outcome {
                    tracing::warn!(
                        target: "keyseq::lane",
                        key = ?slot_for_task,
                        reason = %reason,
                        "predecessor task failed; successor still runs"
                    );
                }
                this_tail.mark_done();
                sweep(&map, slot_for_task, &this_tail);
            }
            .instrument(span)
            .await
        });

        if spawned.is_some() {
            return Ok(());
        }

        // The dispatcher closed between `ExecutorCore::append`'s check and
        // this spawn attempt. The future above was dropped unrun, along with
        // `task` and its caller's oneshot sender (which reports shutdown to
        // the caller's own future on drop) — mark `new_tail` done and sweep
        // it ourselves so the entry we just installed doesn't leak forever
        // with no task left to drive its completion.
        new_tail.mark_done();
        sweep(&self.map, slot, &new_tail);
        Err(KeyseqError::ExecutorShutdown)
    }

    fn lane_count(&self) -> usize {
        self.map.len()
    }
}
