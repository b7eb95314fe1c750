//! Reproduces scenario S2: throughput vs. concurrency ceiling.
//!
//! Runs the same 100-task / 100-distinct-key workload under
//! `max_concurrency = 2` and `max_concurrency = 20`; the latter is expected
//! to finish markedly faster since it can keep up to 20 lanes active at
//! once instead of 2.

use criterion::{criterion_group, criterion_main, Criterion};
use keyseq::{Factory, FactoryConfig};
use std::num::NonZeroUsize;
use std::time::Duration;

fn run_workload(max_concurrency: usize) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let factory = Factory::<u32>::with_config(
            FactoryConfig::new()
                .max_concurrency(NonZeroUsize::new(max_concurrency).unwrap())
                .dispatcher_threads(NonZeroUsize::new(8).unwrap()),
        )
        .unwrap();

        let mut receivers = Vec::with_capacity(100);
        for key in 0..100u32 {
            let handle = factory.handle(key);
            receivers.push(
                handle
                    .submit(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                    })
                    .unwrap(),
            );
        }
        for rx in receivers {
            rx.await.unwrap();
        }
        factory.close();
    });
}

fn bench_concurrency_ceiling(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrency_ceiling");
    group.sample_size(10);
    group.bench_function("max_concurrency_2", |b| b.iter(|| run_workload(2)));
    group.bench_function("max_concurrency_20", |b| b.iter(|| run_workload(20)));
    group.finish();
}

criterion_group!(benches, bench_concurrency_ceiling);
criterion_main!(benches);
