use crate::context::ExecutionContext;
use crate::error::IndexError;
use crate::promise::{IntoPromise, Promise};
use std::iter::Enumerate;

struct Mapping<I: Iterator, U, C, F> {
    items: Enumerate<I>,
    collected: Vec<U>,
    target: Promise<Vec<U>>,
    context: C,
    transform: F,
}

/// Maps `items` through `transform` one at a time.
///
/// `transform(item, index)` runs on `on` and the next item is only started once
/// the promise produced for the previous one fulfilled. Values are collected in
/// input order. The first failure stops the mapping and rejects with an
/// [`IndexError`] naming the failing index.
pub fn async_map<I, T, U, R, C, F>(items: I, on: &C, transform: F) -> Promise<Vec<U>>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
    T: Send + 'static,
    U: Clone + Send + 'static,
    R: IntoPromise<U>,
    C: ExecutionContext + Clone,
    F: FnMut(T, usize) -> R + Send + 'static,
{
    let target = Promise::pending();
    let mapping = Box::new(Mapping {
        items: items.into_iter().enumerate(),
        collected: Vec::new(),
        target: target.clone(),
        context: on.clone(),
        transform,
    });

    on.execute(Box::new(move || advance(mapping)));
    target
}

fn advance<I, T, U, R, C, F>(mut mapping: Box<Mapping<I, U, C, F>>)
where
    I: Iterator<Item = T> + Send + 'static,
    T: Send + 'static,
    U: Clone + Send + 'static,
    R: IntoPromise<U>,
    C: ExecutionContext + Clone,
    F: FnMut(T, usize) -> R + Send + 'static,
{
    let Some((index, item)) = mapping.items.next() else {
        let collected = std::mem::take(&mut mapping.collected);
        mapping.target.fulfill(collected);
        return;
    };

    let produced = (mapping.transform)(item, index).into_promise();
    let context = mapping.context.clone();
    produced.on_settled(&context, move |outcome| match outcome {
        Ok(value) => {
            mapping.collected.push(value);
            advance(mapping)
        }

        Err(error) => {
            log::trace!(target: "pledge", "async_map stopped at item {index}");
            mapping.target.reject(IndexError { index, error });
        }
    });
}
