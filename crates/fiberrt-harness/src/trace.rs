//! Structured JSONL trace records for a single scenario run.
//!
//! `fiberrt-core` itself never logs (see its module docs — the scheduler
//! core is IO-free by design); this module is how the harness recovers a
//! replayable record of "what the scheduler did" from the outside, by having
//! each scenario narrate its own calls into the scheduler API at the moments
//! `spec.md` §4 calls out as scheduler events of interest: a thread created,
//! yielded, blocked, or exited, and a semaphore waited or signaled on.

use serde::{Deserialize, Serialize};

/// The kind of scheduler event a trace record narrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Created,
    Yielded,
    BlockedOnJoin,
    BlockedOnJoinAll,
    BlockedOnSemaphore,
    Resumed,
    SemaphoreSignaled,
    Exited,
}

/// One line of a scenario's trace. `thread` is the harness's own label for
/// the logical thread involved (e.g. `"parent"`, `"child-0"`), not the
/// scheduler's internal [`ThreadHandle`](fiberrt_core::ThreadHandle) — the
/// harness never needs to inspect that handle's interior, only hand it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    pub seq: u64,
    pub thread: String,
    pub event: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// An append-only, shareable trace log. Cloned into every spawned thread's
/// closure alongside the scheduler handle so any scenario can narrate its
/// own events without plumbing a return channel back out.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    events: std::rc::Rc<std::cell::RefCell<Vec<TraceEvent>>>,
}

impl TraceLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, thread: impl Into<String>, event: EventKind) {
        self.record_with_detail(thread, event, None);
    }

    pub fn record_with_detail(
        &self,
        thread: impl Into<String>,
        event: EventKind,
        detail: Option<String>,
    ) {
        let mut events = self.events.borrow_mut();
        let seq = events.len() as u64;
        events.push(TraceEvent {
            seq,
            thread: thread.into(),
            event,
            detail,
        });
    }

    /// Drains the log into a plain `Vec`, leaving it empty for reuse.
    #[must_use]
    pub fn take(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.events.borrow_mut())
    }

    /// Renders the current contents as JSONL (one `TraceEvent` per line).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let events = self.events.borrow();
        let mut out = String::new();
        for event in events.iter() {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase_monotonically() {
        let log = TraceLog::new();
        log.record("parent", EventKind::Created);
        log.record("parent", EventKind::Yielded);
        let events = log.take();
        assert_eq!(events[0].seq, 0);
        assert_eq!(events[1].seq, 1);
    }

    #[test]
    fn take_drains_and_resets_the_log() {
        let log = TraceLog::new();
        log.record("a", EventKind::Created);
        assert_eq!(log.take().len(), 1);
        assert_eq!(log.take().len(), 0);
    }
}
