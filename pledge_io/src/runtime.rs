//! Owned tokio runtimes that serve as background work queues.
//!
//! A [`BackgroundRuntime`] owns a multi-threaded tokio runtime with timers
//! enabled. Dropping it never blocks: the runtime is shut down in the
//! background, so the last owner may be released from inside one of the
//! runtime's own worker threads.
//!
//! The process-wide runtime returned by [`shared`] is built lazily from
//! [`RuntimeConfig::from_env`].

use once_cell::sync::Lazy;
use std::fmt::{Debug, Display, Formatter};
use tokio::runtime::{Builder, Handle, Runtime};

/// Environment variable overriding the worker count of the shared runtime
pub const WORKER_THREADS_ENV: &str = "PLEDGE_WORKER_THREADS";
/// Environment variable overriding the thread name of the shared runtime
pub const THREAD_NAME_ENV: &str = "PLEDGE_THREAD_NAME";

const DEFAULT_THREAD_NAME: &str = "pledge-worker";

static SHARED: Lazy<BackgroundRuntime> = Lazy::new(|| {
    let config = RuntimeConfig::from_env();
    BackgroundRuntime::new(&config)
        .or_else(|err| {
            log::warn!(target: "pledge", "Unable to start shared runtime with {config:?} ({err}); falling back to defaults");
            BackgroundRuntime::new(&RuntimeConfig::default())
        })
        .expect("the shared pledge runtime could not be started")
});

/// Returns the lazily started, process-wide runtime
pub fn shared() -> &'static BackgroundRuntime {
    &SHARED
}

#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    InvalidConfig(&'static str),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(err) => write!(f, "Runtime I/O error: {err}"),
            Self::InvalidConfig(reason) => write!(f, "Invalid runtime configuration: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}

/// Configuration for an owned runtime
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Number of worker threads. `None` lets tokio pick one per core
    pub worker_threads: Option<usize>,
    /// Name given to every worker thread
    pub thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Starts from the defaults and applies [`WORKER_THREADS_ENV`] and
    /// [`THREAD_NAME_ENV`] when they are set. Unparseable values are logged
    /// and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(WORKER_THREADS_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(count) if count > 0 => config.worker_threads = Some(count),
                _ => {
                    log::warn!(target: "pledge", "Ignoring invalid {WORKER_THREADS_ENV}={raw:?}")
                }
            }
        }

        if let Some(name) = lookup(THREAD_NAME_ENV) {
            if !name.trim().is_empty() {
                config.thread_name = name;
            }
        }

        config
    }

    pub fn worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count);
        self
    }

    pub fn thread_name<T: Into<String>>(mut self, name: T) -> Self {
        self.thread_name = name.into();
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.worker_threads == Some(0) {
            return Err(Error::InvalidConfig("worker_threads must be greater than zero"));
        }

        if self.thread_name.is_empty() {
            return Err(Error::InvalidConfig("thread_name must not be empty"));
        }

        Ok(())
    }
}

/// A multi-threaded runtime that shuts down in the background when dropped
pub struct BackgroundRuntime {
    handle: Handle,
    runtime: Option<Runtime>,
}

impl BackgroundRuntime {
    pub fn new(config: &RuntimeConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut builder = Builder::new_multi_thread();
        builder.enable_time().thread_name(config.thread_name.clone());

        if let Some(count) = config.worker_threads {
            builder.worker_threads(count);
        }

        let runtime = builder.build()?;
        log::trace!(target: "pledge", "Started background runtime {config:?}");

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    /// A handle usable to spawn onto this runtime from any thread
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Debug for BackgroundRuntime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundRuntime")
            .field("running", &self.runtime.is_some())
            .finish()
    }
}

impl Drop for BackgroundRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            log::trace!(target: "pledge", "Shutting down background runtime");
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn runs_spawned_work() {
        pledge_logging::setup_log_no_panic_hook();
        let runtime = BackgroundRuntime::new(&RuntimeConfig::default().worker_threads(2)).unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        runtime.handle().spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(std::thread::current().name().map(ToString::to_string));
        });

        let name = rx.blocking_recv().unwrap();
        assert_eq!(name.as_deref(), Some(DEFAULT_THREAD_NAME));
    }

    #[test]
    fn rejects_zero_workers() {
        let err = BackgroundRuntime::new(&RuntimeConfig::default().worker_threads(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn rejects_empty_thread_name() {
        let err = BackgroundRuntime::new(&RuntimeConfig::default().thread_name("")).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn can_be_dropped_from_own_worker() {
        pledge_logging::setup_log_no_panic_hook();
        let runtime = Arc::new(BackgroundRuntime::new(&RuntimeConfig::default().worker_threads(1)).unwrap());
        let (tx, rx) = tokio::sync::oneshot::channel();
        let owner = runtime.clone();
        runtime.handle().spawn(async move {
            // the test thread releases its reference first
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(Arc::strong_count(&owner));
            drop(owner);
        });
        drop(runtime);

        assert_eq!(rx.blocking_recv().unwrap(), 1);
    }

    #[test]
    fn env_overrides_are_applied() {
        let vars = HashMap::from([
            (WORKER_THREADS_ENV, "3".to_string()),
            (THREAD_NAME_ENV, "custom-pool".to_string()),
        ]);
        let config = RuntimeConfig::from_lookup(|key| vars.get(key).cloned());

        assert_eq!(config.worker_threads, Some(3));
        assert_eq!(config.thread_name, "custom-pool");
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let vars = HashMap::from([
            (WORKER_THREADS_ENV, "not-a-number".to_string()),
            (THREAD_NAME_ENV, "  ".to_string()),
        ]);
        let config = RuntimeConfig::from_lookup(|key| vars.get(key).cloned());
        let zero = RuntimeConfig::from_lookup(|key| (key == WORKER_THREADS_ENV).then(|| "0".to_string()));

        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(zero.worker_threads, None);
    }

    #[test]
    fn shared_runtime_is_a_singleton() {
        assert!(std::ptr::eq(shared(), shared()));
    }
}
