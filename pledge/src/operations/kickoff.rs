use crate::context::{ExecutionContext, SharedQueue};
use crate::promise::{IntoPromise, Promise};

/// Runs `block` on the global queue and settles with what it returns: a
/// `Result`, or a `Promise` that is adopted
pub fn kickoff<T, R, F>(block: F) -> Promise<T>
where
    T: Clone + Send + 'static,
    R: IntoPromise<T>,
    F: FnOnce() -> R + Send + 'static,
{
    kickoff_on(&SharedQueue::global(), block)
}

/// [`kickoff`] on a context of the caller's choosing
pub fn kickoff_on<T, R, C, F>(on: &C, block: F) -> Promise<T>
where
    T: Clone + Send + 'static,
    R: IntoPromise<T>,
    C: ExecutionContext,
    F: FnOnce() -> R + Send + 'static,
{
    let promise = Promise::pending();
    let target = promise.clone();
    on.execute(Box::new(move || block().settle_into(&target)));
    promise
}
