//! Stack-safe recursion via trampolining.
//!
//! Rust does not guarantee tail call optimization, so deeply recursive
//! functions can overflow the stack. This module turns recursion into
//! iteration in two shapes:
//!
//! - [`tail_rec`]: a stepper receives the current arguments and returns
//!   [`Step::Done`] with the result or [`Step::Continue`] with the next
//!   arguments. The driver loops until the stepper is done.
//! - [`Trampoline`]: each step returns the next step as a thunk, which may
//!   call a *different* function. This is what mutually recursive pairs use.
//!
//! Both run in constant stack space regardless of depth.
//!
//! # Examples
//!
//! ## Self Recursion
//!
//! ```rust
//! use deferral::control::{Step, tail_rec};
//!
//! let sum = tail_rec((0_u64, 1_000_000_u64), |(accumulator, n)| {
//!     if n == 0 {
//!         Step::Done(accumulator)
//!     } else {
//!         Step::Continue((accumulator + n, n - 1))
//!     }
//! });
//! assert_eq!(sum, 500_000_500_000);
//! ```
//!
//! ## Mutual Recursion
//!
//! ```rust
//! use deferral::control::Trampoline;
//!
//! fn is_even(n: u64) -> Trampoline<bool> {
//!     if n == 0 {
//!         Trampoline::done(true)
//!     } else {
//!         Trampoline::bounce(move || is_odd(n - 1))
//!     }
//! }
//!
//! fn is_odd(n: u64) -> Trampoline<bool> {
//!     if n == 0 {
//!         Trampoline::done(false)
//!     } else {
//!         Trampoline::bounce(move || is_even(n - 1))
//!     }
//! }
//!
//! assert!(is_even(100_000).run());
//! assert!(!is_odd(100_000).run());
//! ```

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "tagged")]
use crate::tagged::Tagged;

/// The outcome of one step of a recursive computation.
///
/// # Type Parameters
///
/// * `A` - The final result
/// * `S` - The arguments of the next recursive call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Step<A, S> {
    /// Recursion has finished with this result.
    Done(A),
    /// Recurse again with these arguments.
    Continue(S),
}

impl<A, S> Step<A, S> {
    /// Returns `true` if this is a [`Step::Done`].
    #[inline]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Returns `true` if this is a [`Step::Continue`].
    #[inline]
    pub const fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// Returns the result if recursion has finished.
    #[inline]
    pub fn done(self) -> Option<A> {
        match self {
            Self::Done(value) => Some(value),
            Self::Continue(_) => None,
        }
    }

    /// Returns the next arguments if recursion continues.
    #[inline]
    pub fn arguments(self) -> Option<S> {
        match self {
            Self::Done(_) => None,
            Self::Continue(arguments) => Some(arguments),
        }
    }

    /// Transforms the final result.
    pub fn map_done<B, F>(self, function: F) -> Step<B, S>
    where
        F: FnOnce(A) -> B,
    {
        match self {
            Self::Done(value) => Step::Done(function(value)),
            Self::Continue(arguments) => Step::Continue(arguments),
        }
    }

    /// Transforms the next arguments.
    pub fn map_continue<T, F>(self, function: F) -> Step<A, T>
    where
        F: FnOnce(S) -> T,
    {
        match self {
            Self::Done(value) => Step::Done(value),
            Self::Continue(arguments) => Step::Continue(function(arguments)),
        }
    }
}

#[cfg(feature = "tagged")]
impl<A, S> Tagged for Step<A, S> {
    const TYPE_NAME: &'static str = "Step";
    const TAGS: &'static [&'static str] = &["Done", "Continue"];

    fn tag(&self) -> Option<&str> {
        match self {
            Self::Done(_) => Some("Done"),
            Self::Continue(_) => Some("Continue"),
        }
    }
}

/// Runs `stepper` from `seed` until it returns [`Step::Done`].
///
/// Equivalent to a self tail-recursive function whose arguments are `S`,
/// evaluated in a loop.
///
/// # Examples
///
/// ```rust
/// use deferral::control::{Step, tail_rec};
///
/// let factorial = tail_rec((1_u64, 10_u64), |(accumulator, n)| {
///     if n <= 1 {
///         Step::Done(accumulator)
///     } else {
///         Step::Continue((accumulator * n, n - 1))
///     }
/// });
/// assert_eq!(factorial, 3_628_800);
/// ```
pub fn tail_rec<S, A, F>(seed: S, mut stepper: F) -> A
where
    F: FnMut(S) -> Step<A, S>,
{
    let mut step = stepper(seed);
    loop {
        match step {
            Step::Done(value) => return value,
            Step::Continue(arguments) => step = stepper(arguments),
        }
    }
}

/// The next step of a [`Trampoline`], as returned by [`Trampoline::resume`].
pub type Bounce<A> = Box<dyn FnOnce() -> Trampoline<A>>;

/// A computation that is either finished or names the next function to call.
///
/// `Trampoline<A>` encodes recursion as data: [`Trampoline::bounce`] holds a
/// thunk that produces the next state, which may belong to any function with
/// the same result type. [`Trampoline::run`] interprets the chain in a loop.
pub enum Trampoline<A> {
    /// The computation has completed with value `A`.
    Done(A),
    /// The computation continues with the boxed thunk.
    Bounce(Bounce<A>),
}

impl<A> Trampoline<A> {
    /// Creates a finished trampoline.
    #[inline]
    pub const fn done(value: A) -> Self {
        Self::Done(value)
    }

    /// Creates a trampoline that continues with `thunk`.
    ///
    /// The thunk is not evaluated until the trampoline is run.
    #[inline]
    pub fn bounce<F>(thunk: F) -> Self
    where
        F: FnOnce() -> Self + 'static,
    {
        Self::Bounce(Box::new(thunk))
    }

    /// Runs the trampoline to completion in constant stack space.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::control::Trampoline;
    ///
    /// fn count_down(n: u64) -> Trampoline<u64> {
    ///     if n == 0 {
    ///         Trampoline::done(0)
    ///     } else {
    ///         Trampoline::bounce(move || count_down(n - 1))
    ///     }
    /// }
    ///
    /// assert_eq!(count_down(1_000_000).run(), 0);
    /// ```
    pub fn run(self) -> A {
        tail_rec(self, |current| match current {
            Self::Done(value) => Step::Done(value),
            Self::Bounce(thunk) => Step::Continue(thunk()),
        })
    }

    /// Takes at most one step without evaluating any thunk.
    ///
    /// Returns [`Step::Done`] if finished, or [`Step::Continue`] with the
    /// pending thunk, which is useful for incremental evaluation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::control::{Step, Trampoline};
    ///
    /// let trampoline = Trampoline::bounce(|| Trampoline::done(42));
    /// match trampoline.resume() {
    ///     Step::Continue(thunk) => assert!(matches!(thunk().resume(), Step::Done(42))),
    ///     Step::Done(_) => unreachable!(),
    /// }
    /// ```
    pub fn resume(self) -> Step<A, Bounce<A>> {
        match self {
            Self::Done(value) => Step::Done(value),
            Self::Bounce(thunk) => Step::Continue(thunk),
        }
    }
}

#[cfg(feature = "tagged")]
impl<A> Tagged for Trampoline<A> {
    const TYPE_NAME: &'static str = "Trampoline";
    const TAGS: &'static [&'static str] = &["Done", "Bounce"];

    fn tag(&self) -> Option<&str> {
        match self {
            Self::Done(_) => Some("Done"),
            Self::Bounce(_) => Some("Bounce"),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Trampoline<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(value) => formatter.debug_tuple("Done").field(value).finish(),
            Self::Bounce(_) => formatter.debug_tuple("Bounce").field(&"<thunk>").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_tail_rec_done_on_first_step() {
        let result = tail_rec(5, |n: i32| Step::<i32, i32>::Done(n * 2));
        assert_eq!(result, 10);
    }

    #[rstest]
    fn test_tail_rec_collects_in_order() {
        let digits = tail_rec((Vec::new(), 0), |(mut digits, n): (Vec<i32>, i32)| {
            if n == 5 {
                Step::Done(digits)
            } else {
                digits.push(n);
                Step::Continue((digits, n + 1))
            }
        });
        assert_eq!(digits, vec![0, 1, 2, 3, 4]);
    }

    #[rstest]
    fn test_step_accessors() {
        let done: Step<i32, &str> = Step::Done(1);
        let next: Step<i32, &str> = Step::Continue("again");
        assert!(done.is_done());
        assert!(next.is_continue());
        assert_eq!(done.done(), Some(1));
        assert_eq!(next.arguments(), Some("again"));
        assert_eq!(done.map_done(|x| x + 1), Step::Done(2));
        assert_eq!(next.map_continue(str::len), Step::Continue(5));
    }

    #[rstest]
    fn test_trampoline_debug() {
        assert_eq!(format!("{:?}", Trampoline::done(1)), "Done(1)");
        assert_eq!(
            format!("{:?}", Trampoline::bounce(|| Trampoline::done(1))),
            "Bounce(\"<thunk>\")"
        );
    }

    #[cfg(feature = "tagged")]
    #[rstest]
    fn test_step_tags() {
        assert_eq!(Step::<i32, i32>::Done(1).tag(), Some("Done"));
        assert_eq!(Step::<i32, i32>::Continue(1).tag(), Some("Continue"));
        assert_eq!(<Step<i32, i32> as Tagged>::TAGS, &["Done", "Continue"]);
    }
}
