use crate::context::{ExecutionContext, SharedQueue, Work};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A context that can be switched off.
///
/// Until [`invalidate`](Self::invalidate) is called, work is forwarded to the
/// wrapped context. Afterwards every delivery is silently dropped: work
/// scheduled after the call is never queued, and work that was queued before
/// the call but has not started yet is discarded when its turn comes.
///
/// Invalidation never interrupts work that is already running, and it does not
/// cancel the producers feeding the promises whose callbacks use this context.
/// It is meant for owners that are torn down while results are still in
/// flight: invalidate the owner's queue and late callbacks simply never run.
///
/// Clones share the same flag.
#[derive(Clone)]
pub struct InvalidatableQueue {
    valid: Arc<AtomicBool>,
    target: Arc<dyn ExecutionContext>,
}

impl InvalidatableQueue {
    pub fn new<C: ExecutionContext>(target: C) -> Self {
        Self {
            valid: Arc::new(AtomicBool::new(true)),
            target: Arc::new(target),
        }
    }

    pub fn invalidate(&self) {
        if self.valid.swap(false, Ordering::AcqRel) {
            log::trace!(target: "pledge", "Execution context invalidated");
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }
}

impl Default for InvalidatableQueue {
    fn default() -> Self {
        Self::new(SharedQueue::global())
    }
}

impl ExecutionContext for InvalidatableQueue {
    fn execute(&self, work: Work) {
        if !self.is_valid() {
            log::trace!(target: "pledge", "Dropping work scheduled on an invalidated context");
            return;
        }

        let valid = self.valid.clone();
        self.target.execute(Box::new(move || {
            if valid.load(Ordering::Acquire) {
                work()
            } else {
                log::trace!(target: "pledge", "Dropping queued work of an invalidated context");
            }
        }));
    }

    fn runs_inline(&self) -> bool {
        self.target.runs_inline()
    }
}

impl Debug for InvalidatableQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidatableQueue")
            .field("valid", &self.is_valid())
            .finish()
    }
}
