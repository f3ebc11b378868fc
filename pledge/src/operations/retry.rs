/*!
 * # Retry Operations
 *
 * Re-runs a fallible producer until it fulfills or gives up.
 *
 * ## Features
 * - [`retry`]: a fixed budget of `count` retries, so `count + 1` attempts at most
 * - [`retry_with`]: the producer itself decides whether another attempt is
 *   made, seeing the attempt number and the error of the previous attempt
 * - A fixed pause between attempts, timed by a [`SharedQueue`]
 *
 * ## Usage Example
 * ```rust
 * use pledge::prelude::*;
 * use std::time::Duration;
 *
 * let fetched = retry(2, Duration::from_millis(100), || kickoff(|| Ok::<_, Error>("payload")));
 * assert_eq!(fetched.wait().unwrap(), "payload");
 * ```
 *
 * ## Important Notes
 * - The first attempt is made synchronously by the calling thread; later
 *   attempts are made from the queue's workers once the pause elapsed
 * - When attempts run out, the result rejects with the error of the last attempt
 */

use crate::context::{Inline, SharedQueue};
use crate::error::{Error, PromiseError};
use crate::promise::Promise;
use std::sync::Arc;
use std::time::Duration;

/// Everything later attempts need
struct Attempts<T, G> {
    target: Promise<T>,
    queue: SharedQueue,
    delay: Duration,
    generate: G,
}

/// Retries `generate` up to `count` times after a failed first attempt,
/// pausing `delay` before each retry
pub fn retry<T, G>(count: usize, delay: Duration, generate: G) -> Promise<T>
where
    T: Clone + Send + 'static,
    G: Fn() -> Promise<T> + Send + Sync + 'static,
{
    retry_with(&SharedQueue::global(), delay, move |attempt, _| {
        (attempt <= count).then(&generate)
    })
}

/// Calls `generate(attempt, last_error)` until a produced promise fulfills.
///
/// `attempt` counts from zero. Returning `None` stops and rejects with
/// `last_error`, which is [`PromiseError::Empty`] if no attempt was made yet.
pub fn retry_with<T, G>(queue: &SharedQueue, delay: Duration, generate: G) -> Promise<T>
where
    T: Clone + Send + 'static,
    G: Fn(usize, &Error) -> Option<Promise<T>> + Send + Sync + 'static,
{
    let attempts = Arc::new(Attempts {
        target: Promise::pending(),
        queue: queue.clone(),
        delay,
        generate,
    });

    let target = attempts.target.clone();
    make_attempt(attempts, 0, PromiseError::Empty.into());
    target
}

fn make_attempt<T, G>(attempts: Arc<Attempts<T, G>>, attempt: usize, last_error: Error)
where
    T: Clone + Send + 'static,
    G: Fn(usize, &Error) -> Option<Promise<T>> + Send + Sync + 'static,
{
    let Some(produced) = (attempts.generate)(attempt, &last_error) else {
        log::debug!(target: "pledge", "Giving up after {attempt} attempt(s)");
        attempts.target.reject(last_error);
        return;
    };

    produced.on_settled(&Inline, move |outcome| match outcome {
        Ok(value) => {
            attempts.target.fulfill(value);
        }

        Err(error) => {
            log::debug!(target: "pledge", "Attempt {attempt} failed: {error}");
            let (queue, delay) = (attempts.queue.clone(), attempts.delay);
            queue.execute_after(delay, move || make_attempt(attempts, attempt + 1, error));
        }
    });
}
