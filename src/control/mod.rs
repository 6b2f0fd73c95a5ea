//! Control structures for stack-safe recursion and folding.
//!
//! - [`Step`]: the result of one recursive step, done or continue
//! - [`tail_rec`]: loop driver for self tail recursion
//! - [`Trampoline`]: thunk-based driver for mutual recursion
//! - [`fold_while`]: left fold with an early stop, a standalone helper
//!
//! # Examples
//!
//! ```rust
//! use deferral::control::{Step, tail_rec};
//!
//! fn fibonacci(n: u64) -> u64 {
//!     tail_rec((n, 0_u64, 1_u64), |(n, a, b)| {
//!         if n == 0 {
//!             Step::Done(a)
//!         } else {
//!             Step::Continue((n - 1, b, a + b))
//!         }
//!     })
//! }
//!
//! assert_eq!(fibonacci(20), 6765);
//! ```

mod fold;
mod trampoline;

pub use fold::fold_while;
pub use trampoline::{Bounce, Step, Trampoline, tail_rec};
