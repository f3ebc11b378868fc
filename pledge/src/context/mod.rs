//! # Execution Contexts
//!
//! An [`ExecutionContext`] decides where (and whether) a piece of scheduled
//! work runs. Promises never run callbacks themselves: every delivery is handed
//! to the context the callback was registered with.
//!
//! ## Provided contexts
//! - [`SharedQueue`]: a multi-threaded work queue backed by a tokio runtime.
//!   It always schedules, never runs work on the calling thread.
//! - [`InvalidatableQueue`]: wraps another context and silently drops all work
//!   once [`invalidate`](InvalidatableQueue::invalidate) has been called.
//! - [`Inline`]: runs work immediately on the calling thread.
//!
//! Applications with their own scheduler (an event loop, a UI dispatcher, ...)
//! implement [`ExecutionContext`] for it.

use std::sync::Arc;

mod invalidatable;
mod shared_queue;

pub use invalidatable::InvalidatableQueue;
pub use shared_queue::{SharedQueue, SharedQueueBuilder};

/// A unit of work handed to an [`ExecutionContext`]
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// The capability to schedule work for later execution
pub trait ExecutionContext: Send + Sync + 'static {
    /// Schedules `work`. Implementations may drop the work without running it;
    /// dropping it must never block and never panic.
    fn execute(&self, work: Work);

    /// Whether `execute` runs work on the calling thread before returning.
    ///
    /// Contexts answering `true` are skipped while a panicking handler unwinds,
    /// so a second panic cannot abort the process.
    fn runs_inline(&self) -> bool {
        false
    }
}

impl<C: ExecutionContext + ?Sized> ExecutionContext for Arc<C> {
    fn execute(&self, work: Work) {
        (**self).execute(work)
    }

    fn runs_inline(&self) -> bool {
        (**self).runs_inline()
    }
}

impl<C: ExecutionContext + ?Sized> ExecutionContext for Box<C> {
    fn execute(&self, work: Work) {
        (**self).execute(work)
    }

    fn runs_inline(&self) -> bool {
        (**self).runs_inline()
    }
}

/// Runs work synchronously on the thread that schedules it.
///
/// Used for the forwarding links inside combinators, where the scheduled work
/// only moves a settlement from one promise to another.
#[derive(Copy, Clone, Debug, Default)]
pub struct Inline;

impl ExecutionContext for Inline {
    fn execute(&self, work: Work) {
        work()
    }

    fn runs_inline(&self) -> bool {
        true
    }
}
