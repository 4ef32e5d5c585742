//! # fiberrt-membrane
//!
//! The execution-context primitive underneath `fiberrt-core`'s cooperative
//! scheduler: create a context bound to a private stack, atomically swap
//! the running CPU state between two contexts, and release the stack when
//! the context is dropped.
//!
//! This is the only crate in the workspace where `unsafe` is expected —
//! everything above this layer (`fiberrt-core`) is safe Rust.

mod context;
mod stack;

pub use context::{swap, ExecutionContext};
pub use stack::{Stack, DEFAULT_STACK_SIZE};
