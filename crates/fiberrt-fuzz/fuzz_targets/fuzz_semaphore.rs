#![no_main]
//! Fuzzes semaphore wait/signal/destroy sequences across several threads
//! sharing one semaphore, through the public `SchedulerHandle` API (see
//! `fuzz_scheduler.rs` for why this doesn't reach into the private
//! `SemaphoreTable`). A crash means I3 (at-most-one-queue membership) or I5
//! (`value < 0 <=> wait_queue non-empty`) broke.

use libfuzzer_sys::fuzz_target;

use fiberrt_core::{init, SchedulerHandle, SemaphoreHandle};

fn run_ops(h: SchedulerHandle, sem: SemaphoreHandle, ops: &[u8]) {
    for &op in ops {
        match op % 4 {
            0 => h.sem_wait(sem),
            1 => h.sem_signal(sem),
            2 => h.yield_now(),
            // Destroying a semaphore other threads still reference is
            // expected to fail loudly (WaitersStillQueued) rather than
            // corrupt anything; the result is deliberately discarded.
            _ => {
                let _ = h.sem_destroy(sem);
            }
        }
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 || data.len() > 4096 {
        return;
    }
    let thread_count = 1 + (data[0] % 4) as usize;
    let initial = (data[1] % 3) as i64;
    let ops = data[2..].to_vec();

    init(move |h| {
        let sem = h
            .sem_init(initial)
            .expect("initial value is non-negative by construction");

        let chunk = ops.len() / thread_count.max(1);
        let mut children = Vec::new();
        for i in 0..thread_count {
            let start = i * chunk;
            let end = if i + 1 == thread_count { ops.len() } else { start + chunk };
            let slice = ops[start..end].to_vec();
            children.push(h.spawn(move |h2| run_ops(h2, sem, &slice)));
        }
        for child in children {
            // A thread may have already reaped itself if the script never
            // blocks it; `NotAChild`/`AlreadyExited` are both fine outcomes
            // here, only a panic would indicate a real bug.
            let _ = h.join(child);
        }

        // Drain any waiters left blocked by an unbalanced script so the
        // final destroy attempt has a chance to succeed, exercising the
        // "signal after refused destroy" path from spec.md scenario 6.
        for _ in 0..thread_count {
            h.sem_signal(sem);
        }
        let _ = h.sem_destroy(sem);
    });
});
