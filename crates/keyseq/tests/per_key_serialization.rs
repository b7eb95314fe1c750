//! Properties 1 and 2 (per-key serialization, per-key FIFO) and scenario S1.

use keyseq::Factory;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test]
async fn single_key_tasks_never_overlap_and_complete_in_submission_order() {
    let factory = Factory::<&str>::new().unwrap();
    let handle = factory.handle("k");

    let busy = Arc::new(AtomicBool::new(false));
    let completion_order = Arc::new(Mutex::new(Vec::new()));

    let mut receivers = Vec::new();
    for i in 0..100u32 {
        let busy = busy.clone();
        let completion_order = completion_order.clone();
        let rx = handle
            .submit(async move {
                assert!(
                    !busy.swap(true, Ordering::SeqCst),
                    "task {i} observed an overlapping predecessor"
                );
                tokio::time::sleep(Duration::from_micros(200)).await;
                completion_order.lock().unwrap().push(i);
                busy.store(false, Ordering::SeqCst);
                i
            })
            .unwrap();
        receivers.push(rx);
    }

    for (i, rx) in receivers.into_iter().enumerate() {
        assert_eq!(rx.await.unwrap(), i as u32);
    }
    assert_eq!(
        *completion_order.lock().unwrap(),
        (0..100u32).collect::<Vec<_>>()
    );

    factory.close();
}
