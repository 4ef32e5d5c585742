//! Counting semaphore with an embedded FIFO wait queue.

use std::collections::HashMap;

use crate::queue::Queue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SemaphoreId(pub(crate) u64);

/// Opaque handle to a semaphore, returned by
/// [`SchedulerHandle::sem_init`](crate::SchedulerHandle::sem_init).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemaphoreHandle(pub(crate) SemaphoreId);

pub(crate) struct SemaphoreRecord {
    pub value: i64,
    pub queue: Queue,
}

/// Owns every semaphore a scheduler creates, keyed by id. Unlike
/// [`TcbTable`](crate::tcb::TcbTable), entries are actually removed on
/// `sem_destroy` — a semaphore handle has no "zombie" state to preserve,
/// since nothing ever blocks on the handle itself outside of a live wait
/// queue.
#[derive(Default)]
pub(crate) struct SemaphoreTable {
    entries: HashMap<SemaphoreId, SemaphoreRecord>,
    next_id: u64,
}

impl SemaphoreTable {
    pub fn create(&mut self, initial: i64) -> SemaphoreId {
        self.next_id += 1;
        let id = SemaphoreId(self.next_id);
        self.entries.insert(
            id,
            SemaphoreRecord {
                value: initial,
                queue: Queue::default(),
            },
        );
        id
    }

    pub fn get_mut(&mut self, id: SemaphoreId) -> &mut SemaphoreRecord {
        self.entries
            .get_mut(&id)
            .expect("SemaphoreId always names an entry created by this scheduler")
    }

    pub fn is_queue_empty(&self, id: SemaphoreId) -> bool {
        self.entries.get(&id).is_none_or(|s| s.queue.is_empty())
    }

    pub fn remove(&mut self, id: SemaphoreId) {
        self.entries.remove(&id);
    }
}
