//! Typed errors replacing the original C library's `0`/`-1` return codes.

use thiserror::Error;

/// Failure modes for [`SchedulerHandle::join`](crate::SchedulerHandle::join).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// The handle does not name a thread that is currently a live, immediate
    /// child of the calling thread.
    #[error("target thread is not a live immediate child of the caller")]
    NotAChild,
    /// The handle names a thread that has already run to completion.
    #[error("target thread has already exited")]
    AlreadyExited,
}

/// Failure modes for semaphore operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SemaphoreError {
    /// [`SchedulerHandle::sem_init`](crate::SchedulerHandle::sem_init) was
    /// called with a negative initial value.
    #[error("semaphore initial value must be non-negative, got {0}")]
    NegativeInitialValue(i64),
    /// [`SchedulerHandle::sem_destroy`](crate::SchedulerHandle::sem_destroy)
    /// was called while threads were still blocked waiting on it.
    #[error("semaphore still has waiters queued")]
    WaitersStillQueued,
}
