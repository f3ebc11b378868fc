//! Errors carried by rejected promises.
//!
//! Every rejection is an [`Error`]: an opaque, cheaply cloneable wrapper that
//! any `std::error::Error + Send + Sync + 'static` converts into through `?`.
//! The errors synthesized by the combinators themselves are [`PromiseError`],
//! [`StepError`] and [`IndexError`]; recover them with [`Error::downcast_ref`]
//! or [`Promise::catch_as`](crate::Promise::catch_as).

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// The error of a rejected promise
///
/// Cloning shares the underlying error, so every callback of a rejected
/// promise observes the very same value.
#[derive(Clone)]
pub struct Error {
    inner: Arc<anyhow::Error>,
}

impl Error {
    /// Creates an error from a printable message
    pub fn msg<M: Display + Debug + Send + Sync + 'static>(message: M) -> Self {
        Self::from_anyhow(anyhow::Error::msg(message))
    }

    pub fn from_anyhow(err: anyhow::Error) -> Self {
        Self {
            inner: Arc::new(err),
        }
    }

    /// Returns the concrete error if it is of type `E`
    pub fn downcast_ref<E: Display + Debug + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    pub fn is<E: Display + Debug + Send + Sync + 'static>(&self) -> bool {
        self.inner.is::<E>()
    }

    /// Views this error as a standard error, e.g. to return it from `source()`
    pub fn as_std(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &**self.inner
    }

    /// Whether both errors share the same allocation, i.e. one is a clone of the other
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E> From<E> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::from_anyhow(anyhow::Error::new(err))
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&*self.inner, f)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&*self.inner, f)
    }
}

/// Errors synthesized by the combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseError {
    /// A timer promise expired before the raced promise settled
    Timeout,
    /// The value did not satisfy the predicate given to `filter`
    Filtered,
    /// `retry_with` was told to stop before any attempt failed
    Empty,
    /// Every handle to a pending promise was dropped while it was awaited
    Abandoned,
}

impl Display for PromiseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "promise timed out"),
            Self::Filtered => write!(f, "promise value was rejected by a filter"),
            Self::Empty => write!(f, "no attempt was made to produce a value"),
            Self::Abandoned => write!(f, "promise was dropped before it settled"),
        }
    }
}

impl std::error::Error for PromiseError {}

/// Tags a rejection with the number of the chain link that produced it
#[derive(Debug, Clone)]
pub struct StepError {
    pub step: usize,
    pub error: Error,
}

impl Display for StepError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {} failed: {}", self.step, self.error)
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_std())
    }
}

/// Tags a rejection with the index of the input that produced it
#[derive(Debug, Clone)]
pub struct IndexError {
    pub index: usize,
    pub error: Error,
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "item {} failed: {}", self.index, self.error)
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_std())
    }
}
