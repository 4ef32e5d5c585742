//! Semaphore wait/signal cost under contention: two threads alternating
//! turns via a pair of semaphores, each handoff driving the other side
//! through the wait-queue slow path (block, enqueue, context-switch into
//! the engine, get woken by the partner's signal) rather than the fast
//! uncontended decrement-and-continue.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fiberrt_core::init;

fn bench_semaphore_contention(c: &mut Criterion) {
    let rounds: &[u32] = &[100, 1_000, 10_000];
    let mut group = c.benchmark_group("semaphore_contention");

    for &n in rounds {
        group.bench_with_input(BenchmarkId::new("rounds", n), &n, |b, &n| {
            b.iter(|| {
                let report = init(move |h| {
                    // Starts at 0 so the very first wait on either side blocks,
                    // forcing every handoff through the wait-queue slow path.
                    let turn_a = h.sem_init(1).unwrap();
                    let turn_b = h.sem_init(0).unwrap();

                    h.spawn(move |h2| {
                        for _ in 0..n {
                            h2.sem_wait(turn_a);
                            h2.sem_signal(turn_b);
                        }
                    });
                    h.spawn(move |h2| {
                        for _ in 0..n {
                            h2.sem_wait(turn_b);
                            h2.sem_signal(turn_a);
                        }
                    });
                    h.join_all();
                    h.sem_destroy(turn_a).unwrap();
                    h.sem_destroy(turn_b).unwrap();
                });
                criterion::black_box(report);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_semaphore_contention);
criterion_main!(benches);
