//! Strict-FIFO queue of thread ids, intrusive over link fields stored in
//! each [`Tcb`](crate::tcb::Tcb) rather than a separately allocated node.

use crate::tcb::{TcbTable, ThreadId};

/// A FIFO sequence of thread ids. A given [`Tcb`](crate::tcb::Tcb) is linked
/// into at most one `Queue` at a time — the ready queue and every
/// semaphore's wait queue share this same type but are never the same
/// instance, so membership is mutually exclusive by construction.
#[derive(Default)]
pub(crate) struct Queue {
    head: Option<ThreadId>,
    tail: Option<ThreadId>,
}

impl Queue {
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends `id` at the tail. `id` must not already be linked into any
    /// queue.
    pub fn enqueue(&mut self, table: &mut TcbTable, id: ThreadId) {
        debug_assert!(table.get(id).queue_prev.is_none());
        debug_assert!(table.get(id).queue_next.is_none());
        debug_assert_ne!(self.tail, Some(id));

        match self.tail {
            Some(tail) => {
                table.get_mut(tail).queue_next = Some(id);
                table.get_mut(id).queue_prev = Some(tail);
            }
            None => {
                self.head = Some(id);
                table.get_mut(id).queue_prev = None;
            }
        }
        self.tail = Some(id);
        table.get_mut(id).queue_next = None;
    }

    /// Removes and returns the head of the queue, or `None` if the queue is
    /// empty — unlike the original C `dequeue`, this never dereferences a
    /// null head.
    pub fn dequeue(&mut self, table: &mut TcbTable) -> Option<ThreadId> {
        let id = self.head?;
        let next = table.get(id).queue_next;
        self.head = next;
        match next {
            Some(next_id) => table.get_mut(next_id).queue_prev = None,
            None => self.tail = None,
        }
        let tcb = table.get_mut(id);
        tcb.queue_next = None;
        tcb.queue_prev = None;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcb::Tcb;
    use fiberrt_membrane::{ExecutionContext, Stack};

    fn table_with(n: u64) -> (TcbTable, Vec<ThreadId>) {
        let mut table = TcbTable::default();
        let mut ids = Vec::new();
        for i in 0..n {
            let id = ThreadId(i + 1);
            let ctx = ExecutionContext::spawn(Stack::new(), Box::new(|| unreachable!()));
            table.insert(id, Tcb::new(ctx, None, None));
            ids.push(id);
        }
        (table, ids)
    }

    #[test]
    fn dequeue_on_empty_queue_returns_none() {
        let mut table = TcbTable::default();
        let mut q = Queue::default();
        assert_eq!(q.dequeue(&mut table), None);
    }

    #[test]
    fn fifo_order_is_preserved_across_interleaved_enqueues_and_dequeues() {
        let (mut table, ids) = table_with(3);
        let mut q = Queue::default();
        q.enqueue(&mut table, ids[0]);
        q.enqueue(&mut table, ids[1]);
        assert_eq!(q.dequeue(&mut table), Some(ids[0]));
        q.enqueue(&mut table, ids[2]);
        assert_eq!(q.dequeue(&mut table), Some(ids[1]));
        assert_eq!(q.dequeue(&mut table), Some(ids[2]));
        assert_eq!(q.dequeue(&mut table), None);
        assert!(q.is_empty());
    }

    #[test]
    fn single_element_round_trip_leaves_queue_empty() {
        let (mut table, ids) = table_with(1);
        let mut q = Queue::default();
        q.enqueue(&mut table, ids[0]);
        assert!(!q.is_empty());
        assert_eq!(q.dequeue(&mut table), Some(ids[0]));
        assert!(q.is_empty());
    }
}
