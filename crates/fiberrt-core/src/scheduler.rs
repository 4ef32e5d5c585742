//! The scheduler itself: a ready queue, a thread-control-block table, and
//! the operations that move threads between "running", "ready", and
//! "blocked".
//!
//! ## Why every operation is a method on a cheaply-cloned handle
//!
//! The original C library kept all of this in mutable globals and let any
//! function reach them directly. A systems-correctness rewrite of that
//! design would normally reach for a single scheduler object and a
//! thread-local pointer to "whichever one is currently running" — the
//! pattern every stackful-coroutine crate in the ecosystem uses, because a
//! context swap suspends a live `&mut Scheduler` on one stack while control
//! resumes on another, which a thread-local raw pointer papers over with a
//! small unsafe block.
//!
//! This crate avoids that unsafe block entirely. [`SchedulerHandle`] wraps
//! an `Rc<RefCell<SchedulerInner>>` and is cloned into every spawned
//! thread's closure, so reaching the scheduler from deep inside a running
//! thread body never needs ambient/thread-local state. The part that would
//! otherwise need unsafe — never holding a `RefCell` borrow across a
//! context swap, since the swapped-to thread will want to borrow the same
//! cell — is instead enforced by discipline: every method here borrows
//! `SchedulerInner` just long enough to do its bookkeeping and clone out the
//! two [`SharedContext`] handles it needs, drops that borrow, and only then
//! calls [`fiberrt_membrane::swap`] on the cloned handles directly.

use std::cell::RefCell;
use std::rc::Rc;

use fiberrt_membrane::{ExecutionContext, Stack, DEFAULT_STACK_SIZE};

use crate::error::{JoinError, SemaphoreError};
use crate::queue::Queue;
use crate::semaphore::{SemaphoreHandle, SemaphoreTable};
use crate::tcb::{SharedContext, Tcb, TcbTable, ThreadHandle, ThreadId};

struct SchedulerInner {
    tcbs: TcbTable,
    semaphores: SemaphoreTable,
    ready: Queue,
    running: ThreadId,
    engine_context: SharedContext,
    next_thread_id: u64,
    threads_created: u64,
    threads_reaped: u64,
}

/// Counters describing a finished run, returned by [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Total number of threads spawned over the run, including the initial
    /// thread passed to [`init`].
    pub threads_created: u64,
    /// Total number of threads the engine reaped (freed the stack and
    /// saved context of) before the ready queue drained.
    pub threads_reaped: u64,
}

/// A cheap, `Clone`-able reference to a running scheduler.
///
/// Every thread body closure receives its own clone, which is how it reaches
/// back into the scheduler to yield, spawn children, join, or use
/// semaphores — see the module docs for why this replaces the original
/// library's global/thread-local state.
#[derive(Clone)]
pub struct SchedulerHandle(Rc<RefCell<SchedulerInner>>);

/// Runs `entry` as the initial thread of a fresh scheduler, then drives the
/// ready queue until every thread (the initial one and anything it
/// transitively spawns) has exited.
///
/// Blocks the calling OS thread for the whole run; returns only once there
/// is nothing left to schedule.
pub fn init<F>(entry: F) -> BootstrapReport
where
    F: FnOnce(SchedulerHandle) + 'static,
{
    let engine_context = ExecutionContext::capture_current();
    let inner = Rc::new(RefCell::new(SchedulerInner {
        tcbs: TcbTable::default(),
        semaphores: SemaphoreTable::default(),
        ready: Queue::default(),
        running: ThreadId(0),
        engine_context: Rc::new(RefCell::new(Some(engine_context))),
        next_thread_id: 0,
        threads_created: 0,
        threads_reaped: 0,
    }));
    let handle = SchedulerHandle(Rc::clone(&inner));

    let id = {
        let mut sched = inner.borrow_mut();
        sched.next_thread_id += 1;
        ThreadId(sched.next_thread_id)
    };
    let wrapped = wrap_entry(handle.clone(), entry);
    let context = ExecutionContext::spawn(Stack::new(), wrapped);
    {
        let mut sched = inner.borrow_mut();
        sched.tcbs.insert(id, Tcb::new(context, None, None));
        sched.ready.enqueue(&mut sched.tcbs, id);
        sched.threads_created += 1;
    }

    run_loop(&inner);

    let sched = inner.borrow();
    BootstrapReport {
        threads_created: sched.threads_created,
        threads_reaped: sched.threads_reaped,
    }
}

/// Drains the ready queue: repeatedly swaps the engine's own context into
/// the next ready thread, and reaps whatever just exited once control comes
/// back.
///
/// This never holds a borrow of `inner` across the `swap_contexts` call —
/// see the module docs.
fn run_loop(inner: &Rc<RefCell<SchedulerInner>>) {
    loop {
        let next = {
            let mut sched = inner.borrow_mut();
            match sched.ready.dequeue(&mut sched.tcbs) {
                Some(id) => {
                    sched.running = id;
                    id
                }
                None => return,
            }
        };
        let (next_ctx, engine_ctx) = {
            let sched = inner.borrow();
            (
                Rc::clone(&sched.tcbs.get(next).context),
                Rc::clone(&sched.engine_context),
            )
        };
        swap_contexts(&engine_ctx, &next_ctx);

        let mut sched = inner.borrow_mut();
        if sched.tcbs.get(next).exited {
            let ctx = Rc::clone(&sched.tcbs.get(next).context);
            *ctx.borrow_mut() = None;
            sched.threads_reaped += 1;
        }
    }
}

/// Saves the caller's state into `from` and resumes `to`. Neither
/// [`SharedContext`] may be borrowed elsewhere when this is called.
fn swap_contexts(from: &SharedContext, to: &SharedContext) {
    let mut from_guard = from.borrow_mut();
    let mut to_guard = to.borrow_mut();
    let from_ctx = from_guard.as_mut().expect("swap target has a live context");
    let to_ctx = to_guard.as_mut().expect("swap target has a live context");
    fiberrt_membrane::swap(from_ctx, to_ctx);
}

fn wrap_entry<F>(handle: SchedulerHandle, f: F) -> Box<dyn FnMut()>
where
    F: FnOnce(SchedulerHandle) + 'static,
{
    let mut f = Some(f);
    let mut handle = Some(handle);
    Box::new(move || {
        let f = f.take().expect("a spawned thread's entry runs exactly once");
        let handle = handle
            .take()
            .expect("a spawned thread's entry runs exactly once");
        f(handle.clone());
        handle.exit();
    })
}

impl SchedulerHandle {
    /// Spawns a child of the calling thread with the default stack size.
    pub fn spawn<F>(&self, entry: F) -> ThreadHandle
    where
        F: FnOnce(SchedulerHandle) + 'static,
    {
        self.spawn_with_stack_size(DEFAULT_STACK_SIZE, entry)
    }

    /// Spawns a child of the calling thread with an explicit stack size.
    pub fn spawn_with_stack_size<F>(&self, stack_size: usize, entry: F) -> ThreadHandle
    where
        F: FnOnce(SchedulerHandle) + 'static,
    {
        let parent = self.0.borrow().running;
        let id = {
            let mut sched = self.0.borrow_mut();
            sched.next_thread_id += 1;
            ThreadId(sched.next_thread_id)
        };
        let wrapped = wrap_entry(self.clone(), entry);
        let context = ExecutionContext::spawn(Stack::with_size(stack_size), wrapped);

        let mut sched = self.0.borrow_mut();
        let slot = sched.tcbs.get(parent).children.len();
        sched.tcbs.insert(id, Tcb::new(context, Some(parent), Some(slot)));
        sched.tcbs.get_mut(parent).children.push(id);
        sched.ready.enqueue(&mut sched.tcbs, id);
        sched.threads_created += 1;

        ThreadHandle(id)
    }

    /// Relinquishes the CPU to the next ready thread, if any, and rejoins
    /// the ready queue at the tail. A no-op when the ready queue is empty.
    ///
    /// Like every other blocking point, this hands control back to the
    /// engine rather than swapping directly into the next thread — the
    /// engine alone decides what runs next and reaps whatever just
    /// relinquished control, which only works if every swap passes through
    /// it exactly once per hop.
    pub fn yield_now(&self) {
        let (me_ctx, engine_ctx) = {
            let mut sched = self.0.borrow_mut();
            if sched.ready.is_empty() {
                return;
            }
            let me = sched.running;
            sched.ready.enqueue(&mut sched.tcbs, me);
            (
                Rc::clone(&sched.tcbs.get(me).context),
                Rc::clone(&sched.engine_context),
            )
        };
        swap_contexts(&me_ctx, &engine_ctx);
    }

    /// Blocks the calling thread until `target` exits.
    ///
    /// `target` must be a thread spawned by the caller (a live or already-
    /// exited child — its TCB's `parent` link persists past its own exit
    /// precisely so this distinction can be made). Returns
    /// [`JoinError::NotAChild`] if `target` was never the caller's own
    /// child, or [`JoinError::AlreadyExited`] if it was but already ran to
    /// completion before this call.
    pub fn join(&self, target: ThreadHandle) -> Result<(), JoinError> {
        let (me_ctx, engine_ctx) = {
            let mut sched = self.0.borrow_mut();
            let me = sched.running;

            match sched.tcbs.try_get(target.0) {
                None => return Err(JoinError::NotAChild),
                Some(tcb) if tcb.parent != Some(me) => return Err(JoinError::NotAChild),
                Some(tcb) if tcb.exited => return Err(JoinError::AlreadyExited),
                Some(_) => {}
            }

            let tcb = sched.tcbs.get_mut(me);
            tcb.blocked = true;
            tcb.join_target = Some(target.0);
            (
                Rc::clone(&sched.tcbs.get(me).context),
                Rc::clone(&sched.engine_context),
            )
        };
        swap_contexts(&me_ctx, &engine_ctx);
        Ok(())
    }

    /// Blocks the calling thread until every direct child it currently has
    /// has exited. A no-op if the caller has no live children.
    pub fn join_all(&self) {
        let blocked = {
            let mut sched = self.0.borrow_mut();
            let me = sched.running;
            if sched.tcbs.get(me).children.is_empty() {
                return;
            }
            let tcb = sched.tcbs.get_mut(me);
            tcb.blocked = true;
            tcb.join_target = None;
            (
                Rc::clone(&sched.tcbs.get(me).context),
                Rc::clone(&sched.engine_context),
            )
        };
        swap_contexts(&blocked.0, &blocked.1);
    }

    /// Ends the calling thread. Wakes its parent if the parent was blocked
    /// specifically on this thread (`join`) or this was the parent's last
    /// remaining child (`join_all`), unlinks from the parent's child list,
    /// and orphans any still-living children of its own.
    ///
    /// Never returns; the scheduler resumes whichever thread becomes
    /// runnable next.
    pub fn exit(&self) -> ! {
        let (me_ctx, engine_ctx) = {
            let mut sched = self.0.borrow_mut();
            let me = sched.running;

            if let Some(parent) = sched.tcbs.get(me).parent {
                let parent_blocked = sched.tcbs.get(parent).blocked;
                let parent_join_target = sched.tcbs.get(parent).join_target;
                let parent_children_len = sched.tcbs.get(parent).children.len();

                let wake = parent_blocked
                    && match parent_join_target {
                        Some(target) => target == me,
                        None => parent_children_len == 1,
                    };
                if wake {
                    let parent_tcb = sched.tcbs.get_mut(parent);
                    parent_tcb.blocked = false;
                    parent_tcb.join_target = None;
                    sched.ready.enqueue(&mut sched.tcbs, parent);
                }

                let my_slot = sched
                    .tcbs
                    .get(me)
                    .child_slot
                    .expect("a thread with a parent always has a child slot in it");
                let moved = {
                    let parent_tcb = sched.tcbs.get_mut(parent);
                    let removed = parent_tcb.children.swap_remove(my_slot);
                    debug_assert_eq!(removed, me);
                    parent_tcb.children.get(my_slot).copied()
                };
                if let Some(moved_id) = moved {
                    sched.tcbs.get_mut(moved_id).child_slot = Some(my_slot);
                }
                // `parent` is deliberately left intact: `join` needs it to
                // tell "never my child" apart from "was my child, already
                // exited" after this thread is unlinked from its parent's
                // live children list.
                sched.tcbs.get_mut(me).child_slot = None;
            }

            let children = std::mem::take(&mut sched.tcbs.get_mut(me).children);
            for child in children {
                let child_tcb = sched.tcbs.get_mut(child);
                child_tcb.parent = None;
                child_tcb.child_slot = None;
            }

            sched.tcbs.get_mut(me).exited = true;
            (
                Rc::clone(&sched.tcbs.get(me).context),
                Rc::clone(&sched.engine_context),
            )
        };
        swap_contexts(&me_ctx, &engine_ctx);
        unreachable!("an exited thread's context is never swapped back into")
    }

    /// Creates a new semaphore with the given initial value.
    pub fn sem_init(&self, initial: i64) -> Result<SemaphoreHandle, SemaphoreError> {
        if initial < 0 {
            return Err(SemaphoreError::NegativeInitialValue(initial));
        }
        let mut sched = self.0.borrow_mut();
        Ok(SemaphoreHandle(sched.semaphores.create(initial)))
    }

    /// Decrements the semaphore's value; blocks the calling thread if the
    /// value becomes negative.
    pub fn sem_wait(&self, handle: SemaphoreHandle) {
        let swap_needed = {
            let mut sched = self.0.borrow_mut();
            let now_negative = {
                let sem = sched.semaphores.get_mut(handle.0);
                sem.value -= 1;
                sem.value < 0
            };
            if now_negative {
                let me = sched.running;
                {
                    let sem = sched.semaphores.get_mut(handle.0);
                    sem.queue.enqueue(&mut sched.tcbs, me);
                }
                sched.tcbs.get_mut(me).blocked = true;
                Some((
                    Rc::clone(&sched.tcbs.get(me).context),
                    Rc::clone(&sched.engine_context),
                ))
            } else {
                None
            }
        };
        if let Some((me_ctx, engine_ctx)) = swap_needed {
            swap_contexts(&me_ctx, &engine_ctx);
        }
    }

    /// Increments the semaphore's value; wakes the longest-waiting blocked
    /// thread, if the value was negative before the increment.
    pub fn sem_signal(&self, handle: SemaphoreHandle) {
        let waiter = {
            let mut sched = self.0.borrow_mut();
            let should_wake = {
                let sem = sched.semaphores.get_mut(handle.0);
                sem.value += 1;
                sem.value <= 0
            };
            if should_wake {
                let sem = sched.semaphores.get_mut(handle.0);
                sem.queue.dequeue(&mut sched.tcbs)
            } else {
                None
            }
        };
        if let Some(waiter) = waiter {
            let mut sched = self.0.borrow_mut();
            sched.tcbs.get_mut(waiter).blocked = false;
            sched.ready.enqueue(&mut sched.tcbs, waiter);
        }
    }

    /// Destroys a semaphore. Fails with
    /// [`SemaphoreError::WaitersStillQueued`] rather than abandoning blocked
    /// threads.
    pub fn sem_destroy(&self, handle: SemaphoreHandle) -> Result<(), SemaphoreError> {
        let mut sched = self.0.borrow_mut();
        if !sched.semaphores.is_queue_empty(handle.0) {
            return Err(SemaphoreError::WaitersStillQueued);
        }
        sched.semaphores.remove(handle.0);
        Ok(())
    }
}
