//! Timer promises, driven by the time driver of a [`SharedQueue`]'s runtime.

use crate::context::SharedQueue;
use crate::error::PromiseError;
use crate::promise::Promise;
use std::time::Duration;

/// Fulfills with `()` once `after` has elapsed, timed by the global queue
pub fn delay(after: Duration) -> Promise<()> {
    delay_on(&SharedQueue::global(), after)
}

pub fn delay_on(queue: &SharedQueue, after: Duration) -> Promise<()> {
    let promise = Promise::pending();
    let resolver = promise.clone();
    queue.execute_after(after, move || {
        log::trace!(target: "pledge", "Delay of {after:?} elapsed");
        resolver.fulfill(());
    });

    promise
}

/// Rejects with [`PromiseError::Timeout`] once `after` has elapsed. It never fulfills
pub fn timeout<T: Clone + Send + 'static>(after: Duration) -> Promise<T> {
    timeout_on(&SharedQueue::global(), after)
}

pub fn timeout_on<T: Clone + Send + 'static>(queue: &SharedQueue, after: Duration) -> Promise<T> {
    let promise = Promise::pending();
    let resolver = promise.clone();
    queue.execute_after(after, move || {
        log::debug!(target: "pledge", "Timer of {after:?} expired");
        resolver.reject(PromiseError::Timeout);
    });

    promise
}
