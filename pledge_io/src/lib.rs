//! # pledge_io
//!
//! Runtime plumbing shared by the pledge crates.
//!
//! - `locks`: the parking_lot mutex guarding promise state
//! - `runtime`: owned tokio runtimes that back the shared work queues, and their configuration
//!
//! `tokio` is re-exported so downstream crates (and their tests) use the exact
//! same runtime version as the queues built here.
pub mod locks;
pub mod runtime;

pub use locks::Mutex;
pub use runtime::{BackgroundRuntime, Error, RuntimeConfig};

pub use tokio;
