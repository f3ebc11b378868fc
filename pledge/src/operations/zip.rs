//! Joins promises of different types into one promise of a tuple.
//!
//! The tuple is produced once every input fulfilled; the first rejection
//! rejects the result.

use crate::context::Inline;
use crate::promise::Promise;
use pledge_io::Mutex;
use std::sync::Arc;

type Pair<A, B> = (Option<A>, Option<B>);

fn take_pair<A, B>(slots: &mut Pair<A, B>) -> Option<(A, B)> {
    if slots.0.is_some() && slots.1.is_some() {
        slots.0.take().zip(slots.1.take())
    } else {
        None
    }
}

pub fn zip<A, B>(first: &Promise<A>, second: &Promise<B>) -> Promise<(A, B)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    let zipped = Promise::pending();
    let slots: Arc<Mutex<Pair<A, B>>> = Arc::new(Mutex::new((None, None)));

    {
        let (zipped, slots) = (zipped.clone(), slots.clone());
        first.on_settled(&Inline, move |outcome| match outcome {
            Ok(value) => {
                let ready = {
                    let mut slots = slots.lock();
                    slots.0 = Some(value);
                    take_pair(&mut slots)
                };
                if let Some(pair) = ready {
                    zipped.fulfill(pair);
                }
            }
            Err(error) => {
                zipped.reject(error);
            }
        });
    }

    {
        let zipped = zipped.clone();
        second.on_settled(&Inline, move |outcome| match outcome {
            Ok(value) => {
                let ready = {
                    let mut slots = slots.lock();
                    slots.1 = Some(value);
                    take_pair(&mut slots)
                };
                if let Some(pair) = ready {
                    zipped.fulfill(pair);
                }
            }
            Err(error) => {
                zipped.reject(error);
            }
        });
    }

    zipped
}

pub fn zip3<A, B, C>(first: &Promise<A>, second: &Promise<B>, third: &Promise<C>) -> Promise<(A, B, C)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
{
    zip(&zip(first, second), third).map(&Inline, |((a, b), c)| Ok((a, b, c)))
}

pub fn zip4<A, B, C, D>(
    first: &Promise<A>,
    second: &Promise<B>,
    third: &Promise<C>,
    fourth: &Promise<D>,
) -> Promise<(A, B, C, D)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    D: Clone + Send + 'static,
{
    zip(&zip(first, second), &zip(third, fourth)).map(&Inline, |((a, b), (c, d))| Ok((a, b, c, d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, PromiseError};

    #[test]
    fn zips_two_values() {
        let zipped = zip(&Promise::fulfilled("a"), &Promise::fulfilled(1));
        assert_eq!(zipped.value(), Some(("a", 1)));
    }

    #[test]
    fn waits_for_the_slower_side() {
        let left = Promise::pending();
        let right = Promise::pending();
        let zipped = zip(&left, &right);

        right.fulfill(2.5);
        assert!(zipped.is_pending());
        left.fulfill('x');
        assert_eq!(zipped.value(), Some(('x', 2.5)));
    }

    #[test]
    fn first_rejection_rejects() {
        let left = Promise::<u8>::pending();
        let zipped = zip(&left, &Promise::<u8>::rejected(PromiseError::Timeout));
        left.reject(Error::msg("later"));

        assert!(zipped.error().unwrap().is::<PromiseError>());
    }

    #[test]
    fn zips_three_and_four() {
        let three = zip3(&Promise::fulfilled(1), &Promise::fulfilled("two"), &Promise::fulfilled(3.0));
        assert_eq!(three.value(), Some((1, "two", 3.0)));

        let four = zip4(
            &Promise::fulfilled(1),
            &Promise::fulfilled(2u8),
            &Promise::fulfilled('3'),
            &Promise::fulfilled(String::from("4")),
        );
        assert_eq!(four.value(), Some((1, 2u8, '3', String::from("4"))));
    }

    #[test]
    fn zip4_rejects_from_any_position() {
        let four = zip4(
            &Promise::fulfilled(1),
            &Promise::fulfilled(2),
            &Promise::fulfilled(3),
            &Promise::<i32>::rejected(Error::msg("fourth")),
        );
        assert_eq!(four.error().unwrap().to_string(), "fourth");
    }
}
