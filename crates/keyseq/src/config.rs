//! Factory configuration.
//!
//! Deliberately not a fluent builder: the construction surface is out of
//! scope beyond a plain struct plus setters, so validation stays entirely in
//! the type system (`NonZeroUsize` already forbids zero).

use std::num::NonZeroUsize;

/// Which lane strategy a [`crate::Factory`] uses for every key it serves.
///
/// The two strategies share one contract (§4.1/§4.2): they differ only in
/// how a lane is represented internally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LaneStrategyKind {
    /// Each lane is a chain of completion stages; the registry stores only
    /// the tail. See [`crate::lane::chained`].
    #[default]
    ChainedStage,
    /// Each lane borrows a single-threaded worker from a shared pool; the
    /// registry stores the active worker. See [`crate::lane::pooled`].
    PooledWorker,
}

/// Construction parameters for a [`crate::Factory`].
///
/// `Default` yields an unbounded-keys factory with default dispatcher
/// sizing, the chained-stage strategy, and the optional serialization
/// wrapper (§4.6) disabled.
#[derive(Clone, Debug, Default)]
pub struct FactoryConfig {
    max_concurrency: Option<NonZeroUsize>,
    dispatcher_threads: Option<NonZeroUsize>,
    fair_serialization: bool,
    strategy: LaneStrategyKind,
}

impl FactoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of simultaneously active lanes at `n` by hashing keys
    /// onto `n` buckets (§4.7, bounded-keys factory). `None` (the default)
    /// means every distinct key gets its own lane.
    pub fn max_concurrency(mut self, n: NonZeroUsize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Size of the shared dispatcher pool. Defaults to
    /// `std::thread::available_parallelism()`.
    pub fn dispatcher_threads(mut self, n: NonZeroUsize) -> Self {
        self.dispatcher_threads = Some(n);
        self
    }

    /// Arms the §4.6 outer serialization wrapper: a single mutex held only
    /// across submission bookkeeping, never across task execution.
    pub fn fair_serialization(mut self, fair: bool) -> Self {
        self.fair_serialization = fair;
        self
    }

    /// Selects the lane strategy. Defaults to [`LaneStrategyKind::ChainedStage`].
    pub fn strategy(mut self, kind: LaneStrategyKind) -> Self {
        self.strategy = kind;
        self
    }

    pub(crate) fn max_concurrency_value(&self) -> Option<NonZeroUsize> {
        self.max_concurrency
    }

    pub(crate) fn dispatcher_threads_value(&self) -> NonZeroUsize {
        self.dispatcher_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .unwrap_or_else(|_| NonZeroUsize::new(1).expect("1 is nonzero"))
        })
    }

    pub(crate) fn fair_serialization_value(&self) -> bool {
        self.fair_serialization
    }

    pub(crate) fn strategy_value(&self) -> LaneStrategyKind {
        self.strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded_unfair_chained() {
        let cfg = FactoryConfig::default();
        assert_eq!(cfg.max_concurrency_value(), None);
        assert!(!cfg.fair_serialization_value());
        assert_eq!(cfg.strategy_value(), LaneStrategyKind::ChainedStage);
    }

    #[test]
    fn setters_round_trip() {
        let cfg = FactoryConfig::new()
            .max_concurrency(NonZeroUsize::new(4).unwrap())
            .fair_serialization(true)
            .strategy(LaneStrategyKind::PooledWorker);
        assert_eq!(cfg.max_concurrency_value(), NonZeroUsize::new(4));
        assert!(cfg.fair_serialization_value());
        assert_eq!(cfg.strategy_value(), LaneStrategyKind::PooledWorker);
    }

    #[test]
    fn dispatcher_threads_defaults_to_available_parallelism() {
        let cfg = FactoryConfig::new();
        assert!(cfg.dispatcher_threads_value().get() >= 1);
    }
}
