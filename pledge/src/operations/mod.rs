//! Free-standing combinators composing several promises into one.
//!
//! Internal forwarding links run on [`Inline`](crate::context::Inline): they
//! only move a settlement from one promise to another, so they never need a
//! scheduler of their own.

pub mod all;
pub mod async_map;
pub mod kickoff;
pub mod race;
pub mod retry;
pub mod timer;
pub mod zip;

pub use all::{all, all_settled};
pub use async_map::async_map;
pub use kickoff::{kickoff, kickoff_on};
pub use race::race;
pub use retry::{retry, retry_with};
pub use timer::{delay, delay_on, timeout, timeout_on};
pub use zip::{zip, zip3, zip4};
