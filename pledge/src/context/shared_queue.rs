use crate::context::{ExecutionContext, Work};
use pledge_io::runtime::{self, BackgroundRuntime};
use pledge_io::tokio::runtime::Handle;
use pledge_io::RuntimeConfig;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// The default execution context: a work queue drained by a pool of runtime workers.
///
/// Work handed to [`execute`](ExecutionContext::execute) is always spawned
/// onto the runtime, even when the caller already runs on one of its workers.
/// Nothing scheduled through a `SharedQueue` ever runs on the calling thread.
///
/// Cloning is cheap; clones feed the same queue. A queue built through
/// [`SharedQueue::builder`] owns its runtime, which shuts down in the
/// background once the last clone is dropped. Work still queued at that point
/// is dropped without running.
#[derive(Clone)]
pub struct SharedQueue {
    handle: Handle,
    owner: Option<Arc<BackgroundRuntime>>,
}

impl SharedQueue {
    /// The process-wide queue, started lazily on first use.
    ///
    /// Its worker count and thread names honor `PLEDGE_WORKER_THREADS` and
    /// `PLEDGE_THREAD_NAME`.
    pub fn global() -> Self {
        Self {
            handle: runtime::shared().handle().clone(),
            owner: None,
        }
    }

    pub fn builder() -> SharedQueueBuilder {
        SharedQueueBuilder {
            config: RuntimeConfig::default(),
        }
    }

    /// Binds to a runtime owned by the embedding application.
    ///
    /// The runtime must have its time driver enabled for
    /// [`execute_after`](Self::execute_after) and the timer combinators.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            owner: None,
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Schedules `work` to run once `delay` has elapsed
    pub fn execute_after<F>(&self, delay: Duration, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let _ = self.handle.spawn(async move {
            pledge_io::tokio::time::sleep(delay).await;
            work()
        });
    }

    /// Drives `future` to completion on this queue's runtime
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let _ = self.handle.spawn(future);
    }
}

impl ExecutionContext for SharedQueue {
    fn execute(&self, work: Work) {
        let _ = self.handle.spawn(async move { work() });
    }
}

impl Default for SharedQueue {
    fn default() -> Self {
        Self::global()
    }
}

impl Debug for SharedQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedQueue")
            .field("owned", &self.owner.is_some())
            .finish()
    }
}

/// Builds a [`SharedQueue`] that owns a private runtime
pub struct SharedQueueBuilder {
    config: RuntimeConfig,
}

impl SharedQueueBuilder {
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config = self.config.worker_threads(count);
        self
    }

    pub fn thread_name<T: Into<String>>(mut self, name: T) -> Self {
        self.config = self.config.thread_name(name);
        self
    }

    /// Uses `config` wholesale, e.g. one obtained from [`RuntimeConfig::from_env`]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<SharedQueue, pledge_io::Error> {
        let runtime = Arc::new(BackgroundRuntime::new(&self.config)?);
        Ok(SharedQueue {
            handle: runtime.handle().clone(),
            owner: Some(runtime),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn never_runs_on_calling_thread() {
        pledge_logging::setup_log_no_panic_hook();
        let queue = SharedQueue::global();
        let (tx, rx) = mpsc::channel();
        queue.execute(Box::new(move || {
            let _ = tx.send(std::thread::current().id());
        }));

        let ran_on = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(ran_on, std::thread::current().id());
    }

    #[test]
    fn private_queue_uses_configured_workers() {
        pledge_logging::setup_log_no_panic_hook();
        let queue = SharedQueue::builder()
            .worker_threads(1)
            .thread_name("private-queue")
            .build()
            .unwrap();
        let (tx, rx) = mpsc::channel();
        queue.execute(Box::new(move || {
            let _ = tx.send(std::thread::current().name().map(ToString::to_string));
        }));

        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("private-queue"));
    }

    #[test]
    fn invalid_config_is_reported() {
        assert!(SharedQueue::builder().worker_threads(0).build().is_err());
    }

    #[test]
    fn execute_after_waits() {
        pledge_logging::setup_log_no_panic_hook();
        let queue = SharedQueue::global();
        let (tx, rx) = mpsc::channel();
        let started = std::time::Instant::now();
        queue.execute_after(Duration::from_millis(50), move || {
            let _ = tx.send(started.elapsed());
        });

        let elapsed = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(elapsed >= Duration::from_millis(50));
    }

    #[test]
    fn work_is_dropped_after_owner_goes_away() {
        pledge_logging::setup_log_no_panic_hook();
        let queue = SharedQueue::builder().worker_threads(1).build().unwrap();
        let handle = queue.handle().clone();
        drop(queue);

        let (tx, rx) = mpsc::channel::<()>();
        SharedQueue::from_handle(handle).execute(Box::new(move || {
            let _ = tx.send(());
        }));

        // the sender was dropped together with the unrun work
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }
}
