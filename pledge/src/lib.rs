//! # Pledge
//!
//! A thread-safe promise primitive: a container for a value that becomes
//! available later, with ordered callback delivery through pluggable execution
//! contexts and a library of combinators to compose promises.
//!
//! ## Features
//!
//! - **Exactly-once settlement**: a promise settles once, fulfilled or rejected;
//!   later attempts are ignored
//! - **Ordered delivery**: callbacks fire in registration order, each on the
//!   context it was registered with
//! - **Pluggable scheduling**: [`SharedQueue`](context::SharedQueue) runs work
//!   on a shared runtime, [`InvalidatableQueue`](context::InvalidatableQueue)
//!   can be switched off, and any scheduler can implement
//!   [`ExecutionContext`](context::ExecutionContext)
//! - **Combinators**: `all`, `all_settled`, `race`, `zip`, `retry`, `delay`,
//!   `timeout`, `kickoff`, `async_map` and the instance methods `recover`,
//!   `filter`, `finally`, `add_timeout`, `map_error`, `step`, `chain`
//! - **Async interop**: promises can be awaited, and futures spawned as promises
//! - **Zero Unsafe Code**
//!
//! ## Core Components
//!
//! - `context`: execution contexts
//! - `promise`: the promise itself and its chaining methods
//! - `operations`: combinators over several promises, and timers
//! - `error`: the opaque rejection error and the errors combinators synthesize
//!
//! ## Example
//!
//! ```rust
//! use pledge::prelude::*;
//! use std::time::Duration;
//!
//! let queue = SharedQueue::global();
//! let greeting = zip(&kickoff(|| Ok::<_, Error>("hello")), &delay(Duration::from_millis(10)))
//!     .map(&queue, |(word, _)| Ok(format!("{word}, world")))
//!     .add_timeout(Duration::from_secs(1));
//!
//! assert_eq!(greeting.wait().unwrap(), "hello, world");
//! ```
#![forbid(unsafe_code)]
#![deny(trivial_numeric_casts, unused_extern_crates, unused_import_braces)]

/// Convenience import for applications
pub mod prelude {
    pub use crate::context::{ExecutionContext, Inline, InvalidatableQueue, SharedQueue};
    pub use crate::error::{Error, IndexError, PromiseError, StepError};
    pub use crate::operations::*;
    pub use crate::promise::{IntoPromise, Promise, Resolver};
}

pub mod context;
pub mod error;
pub mod operations;
pub mod promise;

pub use error::Error;
pub use promise::{IntoPromise, Promise, PromiseFuture, Resolver};
