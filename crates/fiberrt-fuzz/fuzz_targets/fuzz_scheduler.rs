#![no_main]
//! Fuzzes the public scheduler API (spawn / yield / join_all) against
//! arbitrary operation scripts.
//!
//! `Queue` and the TCB bookkeeping it threads through are private to
//! `fiberrt-core` by design (see its module docs) so this target drives the
//! same bookkeeping indirectly, through the real API surface applications
//! use, rather than reaching into private internals just to fuzz them. A
//! crash here (panic, debug assertion, or hang) means one of I1-I6 broke
//! somewhere behind `SchedulerHandle`.

use libfuzzer_sys::fuzz_target;

use fiberrt_core::{init, SchedulerHandle};

/// Interprets `ops` as a script for one logical thread: each byte mod 4
/// selects yield, spawn-a-child-that-runs-the-rest, join_all, or a no-op.
/// Recursing on a shrinking slice guarantees termination in at most
/// `ops.len()` spawned generations.
fn run_ops(h: SchedulerHandle, ops: &[u8]) {
    let Some((&op, rest)) = ops.split_first() else {
        return;
    };
    match op % 4 {
        0 => {
            h.yield_now();
            run_ops(h, rest);
        }
        1 => {
            let split = rest.len() / 2;
            let (left, right) = rest.split_at(split);
            let left = left.to_vec();
            h.spawn(move |h2| run_ops(h2, &left));
            run_ops(h, right);
        }
        2 => {
            h.join_all();
            run_ops(h, rest);
        }
        _ => run_ops(h, rest),
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    let ops = data.to_vec();
    init(move |h| run_ops(h, &ops));
});
