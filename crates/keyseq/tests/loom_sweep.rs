//! Loom model re-proving the §4.3 sweep/append linearization argument.
//!
//! The production code (`src/lane/chained.rs`) runs on `dashmap`/`tokio`,
//! neither of which loom can see through, so this is a standalone model of
//! the same shape: a "registry slot" guarded by one mutex, with `append`
//! unconditionally installing a new generation and `sweep` removing the
//! slot only if it still holds the generation that just finished. Both
//! operations run under the same lock, which is the entirety of the §4.3
//! correctness argument. Run with `RUSTFLAGS="--cfg loom" cargo test --test
//! loom_sweep --release`.

#![cfg(loom)]

use loom::sync::atomic::{AtomicBool, Ordering};
use loom::sync::{Arc, Mutex};
use loom::thread;

struct Slot {
    /// `Some(generation)` while a lane is active; `None` once swept.
    current_generation: Mutex<Option<usize>>,
    /// Set once generation 0's task has finished, mirroring a chained-stage
    /// `Tail::done`.
    generation_zero_done: AtomicBool,
}

#[test]
fn append_never_loses_to_a_racing_sweep() {
    loom::model(|| {
        let slot = Arc::new(Slot {
            current_generation: Mutex::new(Some(0)),
            generation_zero_done: AtomicBool::new(false),
        });

        // Simulates `append`: a successor is chained behind generation 0 and
        // unconditionally becomes the new tail once it starts.
        let appender = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                let mut guard = slot.current_generation.lock().unwrap();
                *guard = Some(1);
            })
        };

        // Simulates the sweep armed on generation 0's completion: it only
        // removes the slot if generation 0 is still the stored tail.
        let sweeper = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                slot.generation_zero_done.store(true, Ordering::SeqCst);
                let mut guard = slot.current_generation.lock().unwrap();
                if *guard == Some(0) {
                    *guard = None;
                }
            })
        };

        appender.join().unwrap();
        sweeper.join().unwrap();

        // Whichever thread's critical section ran first, the final state
        // always reflects generation 1: either the sweep observed
        // generation 1 already installed and left it alone, or the sweep
        // removed generation 0 first and the append then unconditionally
        // overwrote the slot. No interleaving loses the successor.
        let guard = slot.current_generation.lock().unwrap();
        assert_eq!(*guard, Some(1));
    });
}
