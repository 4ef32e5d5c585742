//! Thread control block and the table that owns every TCB a scheduler ever
//! creates.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use fiberrt_membrane::ExecutionContext;

/// Monotonically increasing, process-lifetime-unique thread id. `0` is
/// reserved and never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ThreadId(pub(crate) u64);

/// Opaque handle to a thread, returned by
/// [`SchedulerHandle::spawn`](crate::SchedulerHandle::spawn) and consumed by
/// [`SchedulerHandle::join`](crate::SchedulerHandle::join).
///
/// Carries no public fields or methods beyond equality — callers are not
/// meant to inspect it, only hold onto it and hand it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadHandle(pub(crate) ThreadId);

/// A saved CPU context, shared so it can be cloned out of the TCB table and
/// swapped into independently of whatever borrow produced the clone (see
/// `SchedulerHandle`'s module docs for why this indirection exists).
pub(crate) type SharedContext = Rc<RefCell<Option<ExecutionContext>>>;

pub(crate) struct Tcb {
    pub context: SharedContext,
    pub parent: Option<ThreadId>,
    pub children: Vec<ThreadId>,
    pub child_slot: Option<usize>,
    pub blocked: bool,
    pub join_target: Option<ThreadId>,
    pub exited: bool,
    pub queue_prev: Option<ThreadId>,
    pub queue_next: Option<ThreadId>,
}

impl Tcb {
    pub fn new(context: ExecutionContext, parent: Option<ThreadId>, child_slot: Option<usize>) -> Self {
        Self {
            context: Rc::new(RefCell::new(Some(context))),
            parent,
            children: Vec::new(),
            child_slot,
            blocked: false,
            join_target: None,
            exited: false,
            queue_prev: None,
            queue_next: None,
        }
    }
}

/// Owns every TCB a scheduler ever creates, keyed by id.
///
/// Entries are never removed. When a thread exits, the engine reaps its
/// expensive resources (the private stack and saved context, held in
/// `context`) but keeps the rest of the record around so a [`ThreadHandle`]
/// obtained before the exit still resolves to a legible
/// [`JoinError::AlreadyExited`](crate::JoinError::AlreadyExited) instead of
/// reading through a freed TCB.
#[derive(Default)]
pub(crate) struct TcbTable {
    entries: HashMap<ThreadId, Tcb>,
}

impl TcbTable {
    pub fn insert(&mut self, id: ThreadId, tcb: Tcb) {
        self.entries.insert(id, tcb);
    }

    pub fn get(&self, id: ThreadId) -> &Tcb {
        self.entries
            .get(&id)
            .expect("ThreadId always names an entry created by this scheduler")
    }

    pub fn get_mut(&mut self, id: ThreadId) -> &mut Tcb {
        self.entries
            .get_mut(&id)
            .expect("ThreadId always names an entry created by this scheduler")
    }

    pub fn try_get(&self, id: ThreadId) -> Option<&Tcb> {
        self.entries.get(&id)
    }
}
