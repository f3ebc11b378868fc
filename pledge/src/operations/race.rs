/*!
 * # Race Operation
 *
 * Settles with whichever input settles first, fulfilled or rejected.
 *
 * ## Usage Example
 * ```rust
 * use pledge::prelude::*;
 * use std::time::Duration;
 *
 * let winner = race(vec![timeout::<u8>(Duration::from_secs(1)), Promise::fulfilled(7)]);
 * assert_eq!(winner.wait().unwrap(), 7);
 * ```
 *
 * ## Important Notes
 * - Racing an empty collection is a programming error and panics
 * - Losing inputs are not cancelled; their later settlements are ignored
 */

use crate::promise::Promise;

/// Settles with the first input to settle
///
/// # Panics
/// If `promises` is empty.
pub fn race<T, I>(promises: I) -> Promise<T>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let promises = promises.into_iter().collect::<Vec<_>>();
    assert!(!promises.is_empty(), "race requires at least one promise");

    let winner = Promise::pending();
    for promise in &promises {
        promise.pipe(&winner);
    }

    winner
}
