//! Dispatcher (§4.4, ~15% share).
//!
//! A shared worker pool that carries all task execution. Lanes never own
//! threads; they only impose ordering on top of whatever the dispatcher
//! hands them. This decoupling is what lets a registry with millions of
//! distinct keys run on a handful of OS threads.

use std::future::Future;
use std::io;
use std::num::NonZeroUsize;

use parking_lot::Mutex;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// Owns a dedicated multi-thread `tokio` runtime sized per
/// [`crate::config::FactoryConfig::dispatcher_threads`].
///
/// A dispatcher never runs on the caller's ambient runtime: the design
/// describes a pool "typically sized to the hardware parallelism" that the
/// factory itself controls, independent of whatever runtime the caller
/// happens to be inside.
pub(crate) struct Dispatcher {
    runtime: Mutex<Option<Runtime>>,
}

impl Dispatcher {
    pub(crate) fn new(threads: NonZeroUsize) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(threads.get())
            .thread_name("keyseq-dispatcher")
            .enable_time()
            .build()?;
        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
        })
    }

    /// Schedules `fut` onto the pool. Returns the underlying `tokio`
    /// `JoinHandle`; lane code generally ignores it (ordering is driven by
    /// completion callbacks, not by joining) but tests use it to await
    /// individual task completion.
    ///
    /// Returns `None`, without running `fut`, if the dispatcher has already
    /// been closed. Checking `factory_closed` before calling `spawn` (as
    /// `ExecutorCore::append` does) narrows the window but can't close it
    /// entirely — `Factory::close` can still land between that check and
    /// this call on another thread — so this is the authoritative guard,
    /// taken under the same lock `close` uses to tear the runtime down.
    /// Callers must treat `None` the same as any other post-shutdown
    /// rejection rather than assuming the check already ruled it out.
    pub(crate) fn spawn<F>(&self, fut: F) -> Option<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = self.runtime.lock();
        let rt = guard.as_ref()?;
        Some(rt.spawn(fut))
    }

    /// Shuts the pool down without blocking the caller. In-flight tasks are
    /// given a grace period to finish; anything still running past it is
    /// dropped. Idempotent.
    pub(crate) fn close(&self) {
        if let Some(rt) = self.runtime.lock().take() {
            rt.shutdown_background();
        }
    }
}
