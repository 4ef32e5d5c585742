//! Private stack storage for an execution context.

/// Default stack size for a spawned execution context.
///
/// On the order of the platform's signal-stack size (historically
/// `SIGSTKSZ`, which modern glibc no longer exposes as a compile-time
/// constant); 256 KiB comfortably covers typical cooperative workloads
/// without the caller needing to think about it.
pub const DEFAULT_STACK_SIZE: usize = 256 * 1024;

/// An owned, heap-allocated stack bound to at most one [`ExecutionContext`](crate::ExecutionContext).
///
/// `Stack` never reallocates or moves its backing buffer after
/// construction — the address handed to `uc_stack.ss_sp` must stay valid
/// for the lifetime of every context built on top of it.
pub struct Stack {
    buf: Option<Box<[u8]>>,
}

impl Stack {
    /// Allocates a stack of [`DEFAULT_STACK_SIZE`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(DEFAULT_STACK_SIZE)
    }

    /// Allocates a stack of exactly `size` bytes.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            buf: Some(vec![0_u8; size].into_boxed_slice()),
        }
    }

    /// A placeholder stack for a context that already owns a stack through
    /// some other means (the initial `getcontext` capture of whatever stack
    /// the calling OS thread is already running on).
    pub(crate) fn borrowed() -> Self {
        Self { buf: None }
    }

    pub(crate) fn base_and_len(&mut self) -> (*mut libc::c_void, usize) {
        match &mut self.buf {
            Some(buf) => (buf.as_mut_ptr().cast(), buf.len()),
            None => (std::ptr::null_mut(), 0),
        }
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
