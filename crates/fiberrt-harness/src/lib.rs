//! Scenario/property conformance runner for [`fiberrt_core`].
//!
//! Runs the seven scenarios of `spec.md` §8 — FIFO yield round-robin,
//! join-specific-child, join-all, a semaphore mutex, a semaphore
//! producer/consumer, a refused-destroy-while-waiters, and an orphaned
//! child — standalone, each emitting a replayable JSONL trace and a
//! pass/fail verdict.

#![forbid(unsafe_code)]

pub mod error;
pub mod report;
pub mod scenarios;
pub mod trace;

pub use error::HarnessError;
pub use report::ConformanceReport;
pub use scenarios::{run_scenario, ScenarioOutcome, SCENARIO_NAMES};

/// Runs every named scenario and collects the results into one report.
#[must_use]
pub fn run_all() -> ConformanceReport {
    let outcomes = SCENARIO_NAMES
        .iter()
        .map(|name| run_scenario(name).expect("name comes from SCENARIO_NAMES itself"))
        .collect();
    ConformanceReport::from_outcomes(outcomes)
}
