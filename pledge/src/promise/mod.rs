//! # Promise
//!
//! A [`Promise`] is a handle to a value that becomes available later. It starts
//! pending and settles exactly once, either fulfilled with a value or rejected
//! with an [`Error`]. Settling twice is a silent no-op.
//!
//! ## Callbacks
//! Callbacks are registered through the chaining methods ([`then`](Promise::then),
//! [`observe`](Promise::observe), [`catch`](Promise::catch), ...). Each is bound
//! to an [`ExecutionContext`] which runs it; the promise itself never invokes a
//! callback on the caller's stack while holding its state lock.
//!
//! - Callbacks registered before settlement fire in registration order, one at
//!   a time: the next is scheduled once the previous one has run, or has been
//!   dropped by its context.
//! - Callbacks registered after settlement are dispatched to their context
//!   right away instead of being stored.
//!
//! ## Chaining
//! [`then`](Promise::then) accepts handlers returning either a `Result` (a
//! plain value, or an error that rejects the next link) or another `Promise`,
//! whose eventual state is adopted. See [`IntoPromise`].
//!
//! ## Unhandled rejections
//! A rejection nobody catches is simply dropped. Nothing is reported.
//!
//! ## Example
//! ```rust
//! use pledge::prelude::*;
//!
//! let queue = SharedQueue::global();
//! let doubled = Promise::create(&queue, |resolver| {
//!     resolver.fulfill(21);
//!     Ok(())
//! })
//! .map(&queue, |value| Ok(value * 2));
//!
//! assert_eq!(doubled.wait().unwrap(), 42);
//! ```

use crate::context::{ExecutionContext, Inline};
use crate::error::Error;
use pledge_io::Mutex;
use state::{Callback, Delivery, State};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

mod extras;
mod future;
mod state;

pub use future::PromiseFuture;

/// A thread-safe handle to an eventually available value.
///
/// Cloning a promise yields another handle to the same state.
pub struct Promise<T> {
    state: Arc<Mutex<State<T>>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// A promise that has not settled yet
    pub fn pending() -> Self {
        Self::from_state(State::Pending(Vec::new()))
    }

    pub fn fulfilled(value: T) -> Self {
        Self::from_state(State::Fulfilled(value))
    }

    pub fn rejected<E: Into<Error>>(error: E) -> Self {
        Self::from_state(State::Rejected(error.into()))
    }

    /// A promise already settled with `outcome`
    pub fn settled(outcome: Result<T, Error>) -> Self {
        Self::from_state(State::from(outcome))
    }

    fn from_state(state: State<T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Runs `work` on `on` and settles with whatever it reports through the
    /// [`Resolver`]. An error returned by `work` rejects the promise, unless
    /// the resolver already settled it.
    pub fn create<C, F>(on: &C, work: F) -> Self
    where
        C: ExecutionContext,
        F: FnOnce(Resolver<T>) -> Result<(), Error> + Send + 'static,
    {
        let promise = Self::pending();
        let resolver = Resolver {
            promise: promise.clone(),
        };

        on.execute(Box::new(move || {
            if let Err(err) = work(resolver.clone()) {
                resolver.reject(err);
            }
        }));

        promise
    }

    /// Fulfills the promise. Returns `false`, changing nothing, if it had already settled
    pub fn fulfill(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Rejects the promise. Returns `false`, changing nothing, if it had already settled
    pub fn reject<E: Into<Error>>(&self, error: E) -> bool {
        self.settle(Err(error.into()))
    }

    pub fn settle(&self, outcome: Result<T, Error>) -> bool {
        let mut state = self.state.lock();
        let callbacks = match &mut *state {
            State::Pending(callbacks) => std::mem::take(callbacks),
            _ => {
                drop(state);
                log::trace!(target: "pledge", "Ignoring settlement of an already settled promise");
                return false;
            }
        };

        let delivery = if callbacks.is_empty() {
            None
        } else {
            Some(Delivery::new(outcome.clone(), callbacks))
        };

        *state = State::from(outcome);
        // callbacks may touch this promise again, so they never run under the lock
        drop(state);

        if let Some(delivery) = delivery {
            log::trace!(target: "pledge", "Promise settled, delivering to waiting callbacks");
            delivery.start();
        }

        true
    }

    fn subscribe(&self, callback: Callback<T>) {
        let outcome = {
            let mut state = self.state.lock();
            match &mut *state {
                State::Pending(callbacks) => {
                    callbacks.push(callback);
                    return;
                }
                State::Fulfilled(value) => Ok(value.clone()),
                State::Rejected(error) => Err(error.clone()),
            }
        };

        Delivery::new(outcome, vec![callback]).start();
    }

    /// Registers a handler receiving the settled outcome, whichever it is
    pub(crate) fn on_settled<C, F>(&self, on: &C, handler: F)
    where
        C: ExecutionContext + Clone,
        F: FnOnce(Result<T, Error>) + Send + 'static,
    {
        self.subscribe(Callback::with_outcome(on, handler))
    }

    /// Registers both handlers and returns this promise unchanged, for fluent
    /// side effects that do not transform the value
    pub fn observe<C, F, R>(&self, on: &C, on_fulfilled: F, on_rejected: R) -> Self
    where
        C: ExecutionContext + Clone,
        F: FnOnce(T) + Send + 'static,
        R: FnOnce(Error) + Send + 'static,
    {
        self.subscribe(Callback::new(on, on_fulfilled, on_rejected));
        self.clone()
    }

    /// Runs `on_rejected` if this promise rejects. Returns this promise unchanged
    pub fn catch<C, R>(&self, on: &C, on_rejected: R) -> Self
    where
        C: ExecutionContext + Clone,
        R: FnOnce(Error) + Send + 'static,
    {
        self.observe(on, |_| {}, on_rejected)
    }

    /// Runs `handler` only if this promise rejects with an error of type `E`.
    ///
    /// Rejections of any other type pass this link untouched and unreported;
    /// add a general [`catch`](Self::catch) when every rejection must be seen.
    pub fn catch_as<E, C, H>(&self, on: &C, handler: H) -> Self
    where
        E: std::fmt::Display + Debug + Send + Sync + 'static,
        C: ExecutionContext + Clone,
        H: FnOnce(&E) + Send + 'static,
    {
        self.catch(on, move |error| {
            if let Some(matched) = error.downcast_ref::<E>() {
                handler(matched);
            }
        })
    }

    /// Chains a computation onto the value of this promise.
    ///
    /// `on_fulfilled` runs on `on` once this promise fulfills. Its result
    /// settles the returned promise: an `Ok` fulfills it, an `Err` rejects it,
    /// and a `Promise` is adopted, so chains flatten instead of nesting. If this
    /// promise rejects, the returned promise rejects with the same error and
    /// `on_fulfilled` never runs.
    pub fn then<U, R, C, F>(&self, on: &C, on_fulfilled: F) -> Promise<U>
    where
        U: Clone + Send + 'static,
        R: IntoPromise<U>,
        C: ExecutionContext + Clone,
        F: FnOnce(T) -> R + Send + 'static,
    {
        let downstream = Promise::pending();
        let (on_value, on_error) = (downstream.clone(), downstream.clone());
        self.subscribe(Callback::new(
            on,
            move |value| on_fulfilled(value).settle_into(&on_value),
            move |error| {
                on_error.reject(error);
            },
        ));

        downstream
    }

    /// [`then`](Self::then) for handlers producing a plain value or an error
    pub fn map<U, C, F>(&self, on: &C, transform: F) -> Promise<U>
    where
        U: Clone + Send + 'static,
        C: ExecutionContext + Clone,
        F: FnOnce(T) -> Result<U, Error> + Send + 'static,
    {
        self.then(on, transform)
    }

    /// Forwards this promise's eventual settlement to `target`
    pub fn pipe(&self, target: &Promise<T>) {
        let (on_value, on_error) = (target.clone(), target.clone());
        self.on_settled(&Inline, move |outcome| match outcome {
            Ok(value) => {
                on_value.fulfill(value);
            }
            Err(error) => {
                on_error.reject(error);
            }
        });
    }

    /// The fulfilled value, if any
    pub fn value(&self) -> Option<T> {
        self.state.lock().value().cloned()
    }

    /// The rejection error, if any
    pub fn error(&self) -> Option<Error> {
        self.state.lock().error().cloned()
    }

    /// The settled outcome, or `None` while pending
    pub fn outcome(&self) -> Option<Result<T, Error>> {
        self.state.lock().outcome()
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().is_pending()
    }

    pub fn is_fulfilled(&self) -> bool {
        self.state.lock().is_fulfilled()
    }

    pub fn is_rejected(&self) -> bool {
        self.state.lock().is_rejected()
    }

    pub fn is_completed(&self) -> bool {
        !self.is_pending()
    }

    /// Whether both handles point at the same promise
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl<T: Debug> Debug for Promise<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        match &*state {
            State::Pending(_) => write!(f, "Promise(Pending, {} callback(s))", state.pending_callbacks()),
            State::Fulfilled(value) => write!(f, "Promise(Fulfilled({value:?}))"),
            State::Rejected(error) => write!(f, "Promise(Rejected({error}))"),
        }
    }
}

/// The settling half of a promise handed to producers by [`Promise::create`]
pub struct Resolver<T> {
    promise: Promise<T>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Resolver<T> {
    pub fn fulfill(&self, value: T) -> bool {
        self.promise.fulfill(value)
    }

    pub fn reject<E: Into<Error>>(&self, error: E) -> bool {
        self.promise.reject(error)
    }

    pub fn settle(&self, outcome: Result<T, Error>) -> bool {
        self.promise.settle(outcome)
    }

    pub fn is_settled(&self) -> bool {
        self.promise.is_completed()
    }
}

/// Anything a chained handler may hand back to settle the next link.
///
/// - `Result<T, Error>` settles the next link directly.
/// - `Promise<T>` is adopted: the next link settles when, and how, it settles.
pub trait IntoPromise<T: Clone + Send + 'static> {
    fn settle_into(self, target: &Promise<T>);

    fn into_promise(self) -> Promise<T>
    where
        Self: Sized,
    {
        let promise = Promise::pending();
        self.settle_into(&promise);
        promise
    }
}

impl<T: Clone + Send + 'static> IntoPromise<T> for Result<T, Error> {
    fn settle_into(self, target: &Promise<T>) {
        target.settle(self);
    }

    fn into_promise(self) -> Promise<T> {
        Promise::settled(self)
    }
}

impl<T: Clone + Send + 'static> IntoPromise<T> for Promise<T> {
    fn settle_into(self, target: &Promise<T>) {
        self.pipe(target)
    }

    fn into_promise(self) -> Promise<T> {
        self
    }
}
