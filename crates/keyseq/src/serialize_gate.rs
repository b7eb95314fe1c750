//! Optional serialization wrapper (§4.6).
//!
//! An outer gate that serializes *entry* into the core under a single
//! mutex. Held only across submission bookkeeping (the per-key atomic
//! registry update inside [`crate::lane::LaneStrategy::append`]), never
//! across task execution. Off by default; [`crate::config::FactoryConfig::fair_serialization`]
//! arms it.
//!
//! Uses `parking_lot`'s fair mutex so that, when enabled, submission order
//! across *all* keys is linearized FIFO rather than subject to the usual
//! barging a plain mutex allows under contention.

use parking_lot::{FairMutex, FairMutexGuard};

pub(crate) struct SerializeGate {
    inner: Option<FairMutex<()>>,
}

impl SerializeGate {
    pub(crate) fn new(fair: bool) -> Self {
        Self {
            inner: fair.then(|| FairMutex::new(())),
        }
    }

    /// Acquires the gate for the duration of the returned guard, or `None`
    /// if the gate is disabled (the common case: a no-op on the hot path).
    pub(crate) fn enter(&self) -> Option<FairMutexGuard<'_, ()>> {
        self.inner.as_ref().map(|m| m.lock())
    }
}
