/*!
 * # Join Operations
 *
 * Waits on a whole collection of promises of the same type.
 *
 * ## Features
 * - [`all`]: fulfills with every value, in input order, once all inputs fulfill.
 *   The first rejection rejects the result right away.
 * - [`all_settled`]: waits for every input regardless of outcome and never
 *   rejects. Rejected inputs show up as `None`.
 * - Both settle immediately with an empty vector when given no promises.
 *
 * ## Usage Example
 * ```rust
 * use pledge::prelude::*;
 *
 * let values = all(vec![Promise::fulfilled(1), Promise::fulfilled(2)]);
 * assert_eq!(values.wait().unwrap(), vec![1, 2]);
 * ```
 *
 * ## Important Notes
 * - Completion is tracked with a countdown, so each input settlement costs O(1)
 * - Inputs that lose to an earlier rejection keep running; their results are dropped
 *
 * ## Related Components
 * - [`race`](crate::operations::race): settles with the first input instead of all of them
 * - [`zip`](crate::operations::zip): joins promises of different types
 */

use crate::context::Inline;
use crate::promise::Promise;
use pledge_io::Mutex;
use std::sync::Arc;

/// Values collected so far, and how many inputs are still outstanding
struct Countdown<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> Countdown<T> {
    fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
            remaining: len,
        }
    }

    /// Stores `value` at `index`. Returns every slot once the last one is filled
    fn fill(&mut self, index: usize, value: Option<T>) -> Option<Vec<Option<T>>> {
        self.slots[index] = value;
        self.remaining -= 1;
        (self.remaining == 0).then(|| std::mem::take(&mut self.slots))
    }
}

/// Fulfills with all values in input order, or rejects with the first error
pub fn all<T, I>(promises: I) -> Promise<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let promises = promises.into_iter().collect::<Vec<_>>();
    if promises.is_empty() {
        return Promise::fulfilled(Vec::new());
    }

    let joined = Promise::pending();
    let countdown = Arc::new(Mutex::new(Countdown::new(promises.len())));

    for (index, promise) in promises.into_iter().enumerate() {
        let joined = joined.clone();
        let countdown = countdown.clone();
        promise.on_settled(&Inline, move |outcome| match outcome {
            Ok(value) => {
                let finished = countdown.lock().fill(index, Some(value));
                if let Some(values) = finished {
                    joined.fulfill(values.into_iter().flatten().collect());
                }
            }

            Err(error) => {
                if joined.reject(error) {
                    log::trace!(target: "pledge", "all: input {index} rejected first");
                }
            }
        });
    }

    joined
}

/// Waits for every input and fulfills with one slot per input: the value, or
/// `None` where the input rejected
pub fn all_settled<T, I>(promises: I) -> Promise<Vec<Option<T>>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let promises = promises.into_iter().collect::<Vec<_>>();
    if promises.is_empty() {
        return Promise::fulfilled(Vec::new());
    }

    let joined = Promise::pending();
    let countdown = Arc::new(Mutex::new(Countdown::new(promises.len())));

    for (index, promise) in promises.into_iter().enumerate() {
        let joined = joined.clone();
        let countdown = countdown.clone();
        promise.on_settled(&Inline, move |outcome| {
            let finished = countdown.lock().fill(index, outcome.ok());
            if let Some(slots) = finished {
                joined.fulfill(slots);
            }
        });
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn countdown_reports_once_full() {
        let mut countdown = Countdown::new(2);
        assert!(countdown.fill(1, Some("b")).is_none());
        assert_eq!(countdown.fill(0, None), Some(vec![None, Some("b")]));
    }

    #[test]
    fn values_keep_input_order() {
        let first = Promise::pending();
        let second = Promise::pending();
        let joined = all(vec![first.clone(), second.clone(), Promise::fulfilled(3)]);

        second.fulfill(2);
        assert!(joined.is_pending());
        first.fulfill(1);
        assert_eq!(joined.value(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn first_rejection_wins() {
        let slow = Promise::<u8>::pending();
        let joined = all(vec![slow.clone(), Promise::rejected(Error::msg("first"))]);
        slow.reject(Error::msg("second"));

        assert_eq!(joined.error().unwrap().to_string(), "first");
    }

    #[test]
    fn settled_slots_mark_rejections() {
        let joined = all_settled(vec![
            Promise::fulfilled(1),
            Promise::rejected(Error::msg("skip")),
            Promise::fulfilled(3),
        ]);

        assert_eq!(joined.value(), Some(vec![Some(1), None, Some(3)]));
    }

    #[test]
    fn empty_inputs_fulfill_immediately() {
        assert_eq!(all(Vec::<Promise<u8>>::new()).value(), Some(vec![]));
        assert_eq!(all_settled(Vec::<Promise<u8>>::new()).value(), Some(vec![]));
    }
}
