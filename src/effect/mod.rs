//! Deferred asynchronous actions over a two-callback protocol.
//!
//! A deferred action is a *recipe*: a function that, given a `resolve` and a
//! `reject` callback, starts some computation and eventually calls one of
//! them. It is cold. Nothing happens until a caller runs it, and every run is
//! an independent execution.
//!
//! Two types wrap the same protocol and differ only in when combinators
//! start their operands:
//!
//! - [`Parallel`]: operands start together (`and`, `or`, `all`, `any`)
//! - [`Task`]: an operand starts once its predecessor resolved (`and`,
//!   `all`, `chain`)
//!
//! Each run settles at most once. The first resolve or reject wins and later
//! callback invocations are ignored, whether they come from a misbehaving
//! recipe or from the losing side of a race. See [`SettlementLatch`].
//!
//! There is no scheduler, cancellation or timeout here; recipes bring their
//! own concurrency substrate. With the `async` feature both types can be
//! awaited and built from Rust futures.
//!
//! # Examples
//!
//! ```rust
//! use deferral::effect::{Parallel, Task};
//! use std::sync::{Arc, Mutex};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let step = |name: &'static str| {
//!     let log = Arc::clone(&log);
//!     Task::<&str, ()>::new(move |resolve, _| {
//!         log.lock().unwrap().push(name);
//!         resolve(name);
//!     })
//! };
//!
//! let sequence = Task::all(vec![step("a"), step("b"), step("c")]);
//! sequence.run(|names| assert_eq!(names, vec!["a", "b", "c"]), |_| {});
//! assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
//!
//! let race = Parallel::<i32, ()>::any(vec![Parallel::never(), Parallel::of(1)]);
//! race.run(|winner| assert_eq!(winner, 1), |_| {});
//! ```

#[cfg(feature = "async")]
mod bridge;
mod callback;
mod error;
mod latch;
mod parallel;
mod task;

pub use callback::{Reject, Resolve};
pub use error::SettlementError;
pub use latch::{Settlement, SettlementLatch};
pub use parallel::Parallel;
pub use task::Task;
