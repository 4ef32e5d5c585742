//! # fiberrt-core
//!
//! A cooperative (non-preemptive) thread scheduler: many logical threads of
//! control, each with its own stack, multiplexed onto a single OS thread by
//! explicit yields rather than timer-driven preemption. Threads form a
//! strict parent/child hierarchy and can block on a child's exit or on a
//! counting semaphore.
//!
//! The scheduler never touches threads or signals; concurrency here means
//! "more than one logical thread exists", not "more than one is running at
//! once" — exactly one runs at a time, and control only moves between them
//! at an explicit yield, join, semaphore wait, or exit.
//!
//! Every operation is a method on [`SchedulerHandle`], cloned into each
//! spawned thread's closure. See [`init`] to start a run.

#![deny(unsafe_code)]

mod error;
mod queue;
mod scheduler;
mod semaphore;
mod tcb;

pub use error::{JoinError, SemaphoreError};
pub use scheduler::{init, BootstrapReport, SchedulerHandle};
pub use semaphore::SemaphoreHandle;
pub use tcb::ThreadHandle;
