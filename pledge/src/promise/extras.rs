//! Instance combinators layered on [`Promise::then`] and [`Promise::observe`]

use crate::context::{ExecutionContext, Inline};
use crate::error::{Error, PromiseError, StepError};
use crate::operations::{race, timeout};
use crate::promise::{IntoPromise, Promise};
use std::time::Duration;

impl<T: Clone + Send + 'static> Promise<T> {
    /// Turns a rejection into whatever `recovery` returns. A value passes through untouched
    pub fn recover<C, F, R>(&self, on: &C, recovery: F) -> Promise<T>
    where
        C: ExecutionContext + Clone,
        F: FnOnce(Error) -> R + Send + 'static,
        R: IntoPromise<T>,
    {
        let downstream = Promise::pending();
        let (on_value, on_error) = (downstream.clone(), downstream.clone());
        self.observe(
            on,
            move |value| {
                on_value.fulfill(value);
            },
            move |error| recovery(error).settle_into(&on_error),
        );

        downstream
    }

    /// Rejects with [`PromiseError::Filtered`] when `predicate` refuses the value
    pub fn filter<C, F>(&self, on: &C, predicate: F) -> Promise<T>
    where
        C: ExecutionContext + Clone,
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        self.map(on, move |value| {
            if predicate(&value) {
                Ok(value)
            } else {
                Err(PromiseError::Filtered.into())
            }
        })
    }

    /// Runs `action` once this promise settles, either way.
    ///
    /// The returned promise carries the same outcome, and settles only after
    /// `action` has run.
    pub fn finally<C, F>(&self, on: &C, action: F) -> Promise<T>
    where
        C: ExecutionContext + Clone,
        F: FnOnce() + Send + 'static,
    {
        let downstream = Promise::pending();
        let target = downstream.clone();
        self.on_settled(on, move |outcome| {
            action();
            target.settle(outcome);
        });

        downstream
    }

    /// Hands the settled outcome to `inspect` and returns this promise unchanged
    pub fn finally_result<C, F>(&self, on: &C, inspect: F) -> Self
    where
        C: ExecutionContext + Clone,
        F: FnOnce(Result<T, Error>) + Send + 'static,
    {
        self.on_settled(on, inspect);
        self.clone()
    }

    /// Races this promise against a timer. If the timer wins, the returned
    /// promise rejects with [`PromiseError::Timeout`]. This promise is not
    /// cancelled and may still settle later; that settlement is ignored.
    pub fn add_timeout(&self, after: Duration) -> Promise<T> {
        race(vec![self.clone(), timeout(after)])
    }

    /// Rewrites the error of a rejection. Values pass through untouched
    pub fn map_error<C, F, E>(&self, on: &C, transform: F) -> Promise<T>
    where
        C: ExecutionContext + Clone,
        F: FnOnce(Error) -> E + Send + 'static,
        E: Into<Error>,
    {
        self.recover(on, move |error| Err::<T, Error>(transform(error).into()))
    }

    /// Wraps a rejection into a [`StepError`] numbered `step`, so a catch at
    /// the end of a long chain can tell which link failed
    pub fn step<C>(&self, on: &C, step: usize) -> Promise<T>
    where
        C: ExecutionContext + Clone,
    {
        self.map_error(on, move |error| StepError { step, error })
    }

    /// Chains `transform` while keeping the original value next to its result
    pub fn chain<U, C, F, R>(&self, on: &C, transform: F) -> Promise<(T, U)>
    where
        U: Clone + Send + 'static,
        C: ExecutionContext + Clone,
        F: FnOnce(T) -> R + Send + 'static,
        R: IntoPromise<U>,
    {
        self.then(on, move |value: T| {
            let kept = value.clone();
            transform(value)
                .into_promise()
                .map(&Inline, move |produced| Ok((kept, produced)))
        })
    }

    /// Replaces either outcome: a value through `on_fulfilled`, an error
    /// through `on_rejected`. Pass `Ok` or `Err` to keep one side as it is.
    pub fn replace<C, F, R>(&self, on: &C, on_fulfilled: F, on_rejected: R) -> Promise<T>
    where
        C: ExecutionContext + Clone,
        F: FnOnce(T) -> Result<T, Error> + Send + 'static,
        R: FnOnce(Error) -> Result<T, Error> + Send + 'static,
    {
        let downstream = Promise::pending();
        let target = downstream.clone();
        self.on_settled(on, move |outcome| {
            target.settle(match outcome {
                Ok(value) => on_fulfilled(value),
                Err(error) => on_rejected(error),
            });
        });

        downstream
    }
}
