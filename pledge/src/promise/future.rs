use crate::context::{Inline, SharedQueue};
use crate::error::{Error, PromiseError};
use crate::promise::Promise;
use futures::channel::oneshot;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// The future returned by awaiting a [`Promise`].
///
/// Resolves to the settled outcome. If every handle to a pending promise is
/// dropped, it can never settle and the future resolves to
/// [`PromiseError::Abandoned`] instead of hanging.
#[must_use = "futures do nothing unless polled"]
pub struct PromiseFuture<T> {
    receiver: oneshot::Receiver<Result<T, Error>>,
}

impl<T> Future for PromiseFuture<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(PromiseError::Abandoned.into())),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T: Clone + Send + 'static> IntoFuture for Promise<T> {
    type Output = Result<T, Error>;
    type IntoFuture = PromiseFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        let (sender, receiver) = oneshot::channel();
        self.on_settled(&Inline, move |outcome| {
            let _ = sender.send(outcome);
        });

        PromiseFuture { receiver }
    }
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Drives `future` on `queue` and settles with its output
    pub fn spawn<F>(queue: &SharedQueue, future: F) -> Self
    where
        F: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let promise = Self::pending();
        let resolver = promise.clone();
        queue.spawn(async move {
            resolver.settle(future.await);
        });

        promise
    }

    /// Blocks the calling thread until this promise settles.
    ///
    /// Meant for tests and tools. Never call it from a worker of the queue
    /// that is supposed to settle this promise.
    pub fn wait(&self) -> Result<T, Error> {
        let (sender, receiver) = std::sync::mpsc::channel();
        self.on_settled(&Inline, move |outcome| {
            let _ = sender.send(outcome);
        });

        receiver
            .recv()
            .unwrap_or_else(|_| Err(PromiseError::Abandoned.into()))
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`. Returns `None` if
    /// the promise is still pending by then
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, Error>> {
        let (sender, receiver) = std::sync::mpsc::channel();
        self.on_settled(&Inline, move |outcome| {
            let _ = sender.send(outcome);
        });

        receiver.recv_timeout(timeout).ok()
    }
}
