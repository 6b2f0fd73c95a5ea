//! `Parallel` - deferred actions composed concurrently.
//!
//! A `Parallel<A, E>` is a recipe for an asynchronous computation that
//! eventually calls `resolve` with an `A` or `reject` with an `E`. Nothing
//! runs until a caller supplies its callbacks to [`Parallel::run`]; every run
//! executes the recipe from scratch.
//!
//! Combinators start all of their operands before waiting on any of them:
//!
//! - [`Parallel::and`] joins two operands, first rejection wins
//! - [`Parallel::or`] races two operands, first settlement wins
//! - [`Parallel::all`] joins a list positionally
//! - [`Parallel::any`] races a list
//!
//! Losing operands are not cancelled; their late callbacks are discarded by
//! the settlement latch of the combined value.
//!
//! # Examples
//!
//! ```rust
//! use deferral::effect::Parallel;
//! use std::sync::{Arc, Mutex};
//!
//! let sum = Parallel::<i32, String>::all(vec![
//!     Parallel::of(1),
//!     Parallel::of(2),
//!     Parallel::of(3),
//! ])
//! .map(|values| values.into_iter().sum::<i32>());
//!
//! let observed = Arc::new(Mutex::new(None));
//! let sink = Arc::clone(&observed);
//! sum.run(move |total| *sink.lock().unwrap() = Some(total), |_| {});
//! assert_eq!(*observed.lock().unwrap(), Some(6));
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::Task;
use super::callback::{Recipe, Reject, Resolve, guard};

#[cfg(feature = "tagged")]
use crate::tagged::Tagged;

/// A deferred action whose combinators run operands concurrently.
///
/// # Type Parameters
///
/// * `A` - The resolution value
/// * `E` - The rejection value
///
/// # Settlement
///
/// Every run of a `Parallel` settles at most once, even if the recipe (or an
/// operand of a combinator) calls its callbacks repeatedly. Only the first
/// call reaches the terminal callbacks.
pub struct Parallel<A, E> {
    recipe: Recipe<A, E>,
}

impl<A, E> Clone for Parallel<A, E> {
    fn clone(&self) -> Self {
        Self {
            recipe: Arc::clone(&self.recipe),
        }
    }
}

impl<A: Send + 'static, E: Send + 'static> Parallel<A, E> {
    /// Creates a `Parallel` from a recipe.
    ///
    /// The recipe receives `resolve` and `reject` and should eventually call
    /// one of them. It may call back synchronously, later from another
    /// thread, or never.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::effect::Parallel;
    ///
    /// let parallel: Parallel<i32, String> = Parallel::new(|resolve, _reject| resolve(42));
    /// ```
    pub fn new<F>(recipe: F) -> Self
    where
        F: Fn(Resolve<A>, Reject<E>) + Send + Sync + 'static,
    {
        Self {
            recipe: Arc::new(move |resolve, reject| {
                let (resolve, reject) = guard("Parallel", resolve, reject);
                recipe(resolve, reject);
            }),
        }
    }

    /// Creates a `Parallel` that resolves immediately with `value`.
    pub fn of(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Self::new(move |resolve, _| resolve(value.clone()))
    }

    /// Creates a `Parallel` that rejects immediately with `error`.
    pub fn reject(error: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::new(move |_, reject| reject(error.clone()))
    }

    /// Creates a `Parallel` that never settles.
    ///
    /// This is the neutral element of [`Parallel::or`]: racing against it
    /// never changes the outcome.
    pub fn never() -> Self {
        Self::new(|_, _| {})
    }

    /// Runs the recipe with the given terminal callbacks.
    ///
    /// Each call starts an independent execution.
    pub fn run<R, J>(&self, resolve: R, reject: J)
    where
        R: Fn(A) + Send + Sync + 'static,
        J: Fn(E) + Send + Sync + 'static,
    {
        self.run_with(Arc::new(resolve), Arc::new(reject));
    }

    /// Runs the recipe with already shared callbacks.
    pub fn run_with(&self, resolve: Resolve<A>, reject: Reject<E>) {
        (self.recipe)(resolve, reject);
    }

    /// Transforms the resolution value. Rejections pass through unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::effect::Parallel;
    /// use std::sync::atomic::{AtomicI32, Ordering};
    /// use std::sync::Arc;
    ///
    /// let seen = Arc::new(AtomicI32::new(0));
    /// let sink = Arc::clone(&seen);
    /// Parallel::<i32, ()>::of(21)
    ///     .map(|x| x * 2)
    ///     .run(move |x| sink.store(x, Ordering::SeqCst), |_| {});
    /// assert_eq!(seen.load(Ordering::SeqCst), 42);
    /// ```
    pub fn map<B, F>(self, function: F) -> Parallel<B, E>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let function = Arc::new(function);
        Parallel::new(move |resolve: Resolve<B>, reject| {
            let function = Arc::clone(&function);
            self.run_with(Arc::new(move |value| resolve(function(value))), reject);
        })
    }

    /// Runs both operands concurrently and resolves with both results.
    ///
    /// Both recipes are started, `self` first, before either outcome is
    /// awaited. The pair is positional regardless of completion order. The
    /// first rejection from either side rejects the result and the other
    /// side's outcome is discarded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::effect::Parallel;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let observed = Arc::new(Mutex::new(None));
    /// let sink = Arc::clone(&observed);
    /// Parallel::<_, ()>::of("left")
    ///     .and(Parallel::of(2))
    ///     .run(move |pair| *sink.lock().unwrap() = Some(pair), |_| {});
    /// assert_eq!(*observed.lock().unwrap(), Some(("left", 2)));
    /// ```
    pub fn and<B>(self, other: Parallel<B, E>) -> Parallel<(A, B), E>
    where
        B: Send + 'static,
    {
        Parallel::new(move |resolve: Resolve<(A, B)>, reject| {
            let join = Arc::new(Join::new());

            let on_left: Resolve<A> = {
                let join = Arc::clone(&join);
                let resolve = Arc::clone(&resolve);
                Arc::new(move |value| {
                    if let Some(pair) = join.fill_left(value) {
                        resolve(pair);
                    }
                })
            };
            let on_right: Resolve<B> = Arc::new(move |value| {
                if let Some(pair) = join.fill_right(value) {
                    resolve(pair);
                }
            });

            self.run_with(on_left, Arc::clone(&reject));
            other.run_with(on_right, reject);
        })
    }

    /// Races both operands: whichever settles first, in either direction,
    /// decides the result.
    ///
    /// A fast rejection beats a slow resolution.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::effect::Parallel;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let observed = Arc::new(Mutex::new(None));
    /// let sink = Arc::clone(&observed);
    /// Parallel::<i32, ()>::never()
    ///     .or(Parallel::of(7))
    ///     .run(move |x| *sink.lock().unwrap() = Some(x), |_| {});
    /// assert_eq!(*observed.lock().unwrap(), Some(7));
    /// ```
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::new(move |resolve, reject| {
            self.run_with(Arc::clone(&resolve), Arc::clone(&reject));
            other.run_with(resolve, reject);
        })
    }

    /// Semigroup append for `Parallel`; the same race as [`Parallel::or`].
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        self.or(other)
    }

    /// Joins a list of operands into a list of results, in operand order.
    ///
    /// Behaves like a left fold of [`Parallel::and`] starting from an empty
    /// list, but runs flat: every operand's recipe is started in list order
    /// before any outcome is awaited, and results are gathered into one
    /// shared slot vector. Stack usage does not grow with the list length.
    ///
    /// The first rejection rejects the result. An empty list resolves to an
    /// empty list.
    pub fn all<I>(parallels: I) -> Parallel<Vec<A>, E>
    where
        I: IntoIterator<Item = Self>,
    {
        let parallels: Arc<[Self]> = parallels.into_iter().collect();
        Parallel::new(move |resolve: Resolve<Vec<A>>, reject| {
            if parallels.is_empty() {
                resolve(Vec::new());
                return;
            }

            let gather = Arc::new(Gather::new(parallels.len()));
            for (index, parallel) in parallels.iter().enumerate() {
                let gather = Arc::clone(&gather);
                let resolve = Arc::clone(&resolve);
                parallel.run_with(
                    Arc::new(move |value| {
                        if let Some(values) = gather.fill(index, value) {
                            resolve(values);
                        }
                    }),
                    Arc::clone(&reject),
                );
            }
        })
    }

    /// Races a list of operands; the first to settle decides the result.
    ///
    /// Equivalent to a left fold of [`Parallel::or`] starting from
    /// [`Parallel::never`], with every operand started in list order from a
    /// single loop. An empty list never settles.
    pub fn any<I>(parallels: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let parallels: Arc<[Self]> = parallels.into_iter().collect();
        Self::new(move |resolve, reject| {
            for parallel in parallels.iter() {
                parallel.run_with(Arc::clone(&resolve), Arc::clone(&reject));
            }
        })
    }

    /// Changes the scheduling discipline to sequential composition.
    pub fn into_task(self) -> Task<A, E> {
        Task::new(move |resolve, reject| self.run_with(resolve, reject))
    }
}

impl<F: Send + 'static, E: Send + 'static> Parallel<F, E> {
    /// Applies the resolved function to the resolved value.
    ///
    /// Function and value are computed concurrently, as with
    /// [`Parallel::and`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::effect::Parallel;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let observed = Arc::new(Mutex::new(None));
    /// let sink = Arc::clone(&observed);
    /// let double: fn(i32) -> i32 = |x| x * 2;
    /// Parallel::<_, ()>::of(double)
    ///     .ap(Parallel::of(5))
    ///     .run(move |x| *sink.lock().unwrap() = Some(x), |_| {});
    /// assert_eq!(*observed.lock().unwrap(), Some(10));
    /// ```
    pub fn ap<V, B>(self, values: Parallel<V, E>) -> Parallel<B, E>
    where
        F: FnOnce(V) -> B,
        V: Send + 'static,
        B: Send + 'static,
    {
        self.and(values).map(|(function, value)| function(value))
    }
}

#[cfg(feature = "tagged")]
impl<A, E> Tagged for Parallel<A, E> {
    const TYPE_NAME: &'static str = "Parallel";

    fn tag(&self) -> Option<&str> {
        None
    }
}

impl<A, E> fmt::Debug for Parallel<A, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Parallel").field(&"<recipe>").finish()
    }
}

static_assertions::assert_impl_all!(Parallel<i32, String>: Send, Sync, Clone);

/// Result slots for one run of [`Parallel::and`].
struct Join<A, B> {
    slots: Mutex<(Option<A>, Option<B>)>,
}

impl<A, B> Join<A, B> {
    fn new() -> Self {
        Self {
            slots: Mutex::new((None, None)),
        }
    }

    fn fill_left(&self, value: A) -> Option<(A, B)> {
        let mut slots = self.slots.lock();
        if slots.0.is_some() {
            return None;
        }
        slots.0 = Some(value);
        Self::take_if_complete(&mut slots)
    }

    fn fill_right(&self, value: B) -> Option<(A, B)> {
        let mut slots = self.slots.lock();
        if slots.1.is_some() {
            return None;
        }
        slots.1 = Some(value);
        Self::take_if_complete(&mut slots)
    }

    fn take_if_complete(slots: &mut (Option<A>, Option<B>)) -> Option<(A, B)> {
        if slots.0.is_some() && slots.1.is_some() {
            slots.0.take().zip(slots.1.take())
        } else {
            None
        }
    }
}

/// Result slots for one run of [`Parallel::all`].
struct Gather<A> {
    slots: Mutex<(Vec<Option<A>>, usize)>,
}

impl<A> Gather<A> {
    fn new(length: usize) -> Self {
        let mut values = Vec::with_capacity(length);
        values.resize_with(length, || None);
        Self {
            slots: Mutex::new((values, length)),
        }
    }

    /// Stores the value of operand `index`; returns every value once the
    /// last empty slot is filled.
    fn fill(&self, index: usize, value: A) -> Option<Vec<A>> {
        let mut slots = self.slots.lock();
        let (values, remaining) = &mut *slots;
        let slot = values.get_mut(index)?;
        if slot.is_some() {
            return None;
        }
        *slot = Some(value);
        *remaining -= 1;
        if *remaining == 0 {
            Some(values.drain(..).flatten().collect())
        } else {
            None
        }
    }
}
