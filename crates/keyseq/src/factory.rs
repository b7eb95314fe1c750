//! Factory (§4.7, ~10% share).
//!
//! Hands out per-key handles. Two shapes share one type: an unbounded-keys
//! factory (every distinct key gets its own lane) and a bounded-keys factory
//! (keys are hashed onto `N` buckets and share lanes within a bucket),
//! selected by whether [`FactoryConfig::max_concurrency`] is set.

use std::io;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{FactoryConfig, LaneStrategyKind};
use crate::dispatcher::Dispatcher;
use crate::executor::Executor;
use crate::key::{bucket_of, Slot, SequenceKey};
use crate::lane::chained::ChainedRegistry;
use crate::lane::pooled::PooledRegistry;
use crate::lane::LaneStrategy;
use crate::serialize_gate::SerializeGate;

/// The user-facing entry point that mints per-key handles.
pub struct Factory<K> {
    strategy: Arc<dyn LaneStrategy<K>>,
    dispatcher: Arc<Dispatcher>,
    gate: Arc<SerializeGate>,
    closed: Arc<AtomicBool>,
    max_concurrency: Option<NonZeroUsize>,
}

impl<K> Factory<K>
where
    K: SequenceKey,
{
    /// Unbounded keys, default dispatcher sizing, chained-stage strategy,
    /// fair serialization off.
    pub fn new() -> io::Result<Self> {
        Self::with_config(FactoryConfig::default())
    }

    pub fn with_config(cfg: FactoryConfig) -> io::Result<Self> {
        let dispatcher = Arc::new(Dispatcher::new(cfg.dispatcher_threads_value())?);
        let strategy: Arc<dyn LaneStrategy<K>> = match cfg.strategy_value() {
            LaneStrategyKind::ChainedStage => Arc::new(ChainedRegistry::new(dispatcher.clone())),
            LaneStrategyKind::PooledWorker => Arc::new(PooledRegistry::new(dispatcher.clone())),
        };
        Ok(Self {
            strategy,
            dispatcher,
            gate: Arc::new(SerializeGate::new(cfg.fair_serialization_value())),
            closed: Arc::new(AtomicBool::new(false)),
            max_concurrency: cfg.max_concurrency_value(),
        })
    }

    /// Returns a stable handle for `key` (§6 `Factory.handle`). Distinct
    /// calls for an equal key are not required to return the same `Executor`
    /// value — only that submissions through any handle for that key
    /// serialize, which they do because both route to the same registry
    /// slot.
    pub fn handle(&self, key: K) -> Executor<K> {
        let slot = match self.max_concurrency {
            Some(n) => Slot::Bucket(bucket_of(&key, n.get())),
            None => Slot::Direct(key),
        };
        Executor::new(
            slot,
            self.strategy.clone(),
            self.gate.clone(),
            self.closed.clone(),
        )
    }

    /// Current number of active lanes (§3.1, property 4 "no lane leak").
    pub fn lane_count(&self) -> usize {
        self.strategy.lane_count()
    }

    /// Closes the underlying dispatcher pool. Handles obtained before this
    /// call report themselves shut down and terminated afterward (property
    /// 7); idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.dispatcher.close();
    }
}
