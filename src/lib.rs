//! # deferral
//!
//! Tagged values, stack-safe recursion and callback-based asynchronous
//! combinators for Rust.
//!
//! ## Overview
//!
//! - **Tagged values**: runtime type and variant discriminants, dispatch
//!   tables and `#[derive(Tagged)]` for native enums
//! - **Control Structures**: `tail_rec` and `Trampoline` for stack-safe
//!   self and mutual recursion, plus a standalone `fold_while` helper
//! - **Deferred actions**: `Parallel` (concurrent join and race) and `Task`
//!   (sequential composition) over a `(resolve, reject)` callback protocol,
//!   with at-most-once settlement
//!
//! ## Feature Flags
//!
//! - `tagged`: Tagged values and dispatch
//! - `control`: Trampoline, `tail_rec`, `fold_while`
//! - `effect`: `Parallel` and `Task` (enables `control`)
//! - `async`: Await deferred actions and build them from futures (tokio)
//! - `derive`: `#[derive(Tagged)]`
//! - `serde`: Serialization of `TaggedValue` and `Step`
//! - `tracing`: Trace events for discarded late settlements
//! - `full`: Enable all of the above
//!
//! ## Example
//!
//! ```rust
//! use deferral::prelude::*;
//!
//! let total = tail_rec((0_u64, 100_u64), |(sum, n)| {
//!     if n == 0 { Step::Done(sum) } else { Step::Continue((sum + n, n - 1)) }
//! });
//!
//! Parallel::<u64, ()>::of(total)
//!     .and(Parallel::of(1))
//!     .map(|(sum, one)| sum + one)
//!     .run(|value| assert_eq!(value, 5051), |_| {});
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use deferral::prelude::*;
/// ```
pub mod prelude {

    #[cfg(feature = "tagged")]
    pub use crate::tagged::*;

    #[cfg(feature = "control")]
    pub use crate::control::*;

    #[cfg(feature = "effect")]
    pub use crate::effect::*;

    #[cfg(feature = "derive")]
    pub use deferral_derive::Tagged;
}

#[cfg(feature = "tagged")]
pub mod tagged;

#[cfg(feature = "control")]
pub mod control;

#[cfg(feature = "effect")]
pub mod effect;

#[cfg(feature = "derive")]
pub use deferral_derive::Tagged;
