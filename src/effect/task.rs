//! `Task` - deferred actions composed sequentially.
//!
//! `Task<A, E>` shares the callback protocol and at-most-once settlement of
//! [`Parallel`], but its combinators never start an operand before the
//! previous one has resolved:
//!
//! - [`Task::and`] runs the second operand only after the first resolved
//! - [`Task::all`] runs a list one operand at a time, in order
//! - [`Task::chain`] feeds the resolution value into the next stage
//!
//! A rejection at any stage short-circuits: later stages never start.
//!
//! # Examples
//!
//! ```rust
//! use deferral::effect::Task;
//! use std::sync::{Arc, Mutex};
//!
//! let parse = |input: &'static str| {
//!     Task::attempt(move || input.parse::<i32>().map_err(|error| error.to_string()))
//! };
//!
//! let pipeline = parse("20")
//!     .chain(|x| Task::of(x + 1))
//!     .map(|x| x * 2);
//!
//! let observed = Arc::new(Mutex::new(None));
//! let sink = Arc::clone(&observed);
//! pipeline.run(move |x| *sink.lock().unwrap() = Some(Ok(x)), {
//!     let sink = Arc::clone(&observed);
//!     move |error| *sink.lock().unwrap() = Some(Err(error))
//! });
//! assert_eq!(*observed.lock().unwrap(), Some(Ok(42)));
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::Parallel;
use super::callback::{Recipe, Reject, Resolve, guard};

use crate::control::{Step, tail_rec};
#[cfg(feature = "tagged")]
use crate::tagged::Tagged;

/// A deferred action whose combinators run operands one after another.
///
/// # Type Parameters
///
/// * `A` - The resolution value
/// * `E` - The rejection value
///
/// # Monad Laws
///
/// With equality meaning "settles the same way when run":
///
/// 1. **Left Identity**: `Task::of(a).chain(f) == f(a)`
/// 2. **Right Identity**: `m.chain(Task::of) == m`
/// 3. **Associativity**: `m.chain(f).chain(g) == m.chain(|x| f(x).chain(g))`
pub struct Task<A, E> {
    recipe: Recipe<A, E>,
}

impl<A, E> Clone for Task<A, E> {
    fn clone(&self) -> Self {
        Self {
            recipe: Arc::clone(&self.recipe),
        }
    }
}

impl<A: Send + 'static, E: Send + 'static> Task<A, E> {
    /// Creates a `Task` from a recipe.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::effect::Task;
    ///
    /// let task: Task<i32, String> = Task::new(|resolve, _reject| resolve(42));
    /// ```
    pub fn new<F>(recipe: F) -> Self
    where
        F: Fn(Resolve<A>, Reject<E>) + Send + Sync + 'static,
    {
        Self {
            recipe: Arc::new(move |resolve, reject| {
                let (resolve, reject) = guard("Task", resolve, reject);
                recipe(resolve, reject);
            }),
        }
    }

    /// Creates a `Task` that resolves immediately with `value`.
    pub fn of(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Self::new(move |resolve, _| resolve(value.clone()))
    }

    /// Creates a `Task` that rejects immediately with `error`.
    pub fn reject(error: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::new(move |_, reject| reject(error.clone()))
    }

    /// Creates a `Task` from a synchronous fallible computation.
    ///
    /// `Ok` resolves and `Err` rejects. The computation runs on every run of
    /// the task.
    pub fn attempt<F>(computation: F) -> Self
    where
        F: Fn() -> Result<A, E> + Send + Sync + 'static,
    {
        Self::new(move |resolve, reject| match computation() {
            Ok(value) => resolve(value),
            Err(error) => reject(error),
        })
    }

    /// Runs the recipe with the given terminal callbacks.
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
    pub fn map<B, F>(self, function: F) -> Task<B, E>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let function = Arc::new(function);
        Task::new(move |resolve: Resolve<B>, reject| {
            let function = Arc::clone(&function);
            self.run_with(Arc::new(move |value| resolve(function(value))), reject);
        })
    }

    /// Runs `self`, then feeds its value to `function` and adopts the
    /// outcome of the returned task.
    ///
    /// If `self` rejects, `function` is never called.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::effect::Task;
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    ///
    /// let called = Arc::new(AtomicBool::new(false));
    /// let flag = Arc::clone(&called);
    /// let task = Task::<i32, &str>::reject("no input").chain(move |x| {
    ///     flag.store(true, Ordering::SeqCst);
    ///     Task::of(x + 1)
    /// });
    /// task.run(|_| {}, |_| {});
    /// assert!(!called.load(Ordering::SeqCst));
    /// ```
    pub fn chain<B, F>(self, function: F) -> Task<B, E>
    where
        B: Send + 'static,
        F: Fn(A) -> Task<B, E> + Send + Sync + 'static,
    {
        let function = Arc::new(function);
        Task::new(move |resolve: Resolve<B>, reject: Reject<E>| {
            let function = Arc::clone(&function);
            let next_reject = Arc::clone(&reject);
            self.run_with(
                Arc::new(move |value| {
                    function(value).run_with(Arc::clone(&resolve), Arc::clone(&next_reject));
                }),
                reject,
            );
        })
    }

    /// Alias for [`Task::chain`].
    #[inline]
    pub fn and_then<B, F>(self, function: F) -> Task<B, E>
    where
        B: Send + 'static,
        F: Fn(A) -> Task<B, E> + Send + Sync + 'static,
    {
        self.chain(function)
    }

    /// Runs `self`, then `other`, and resolves with both results.
    ///
    /// `other` is not started until `self` has resolved; if `self` rejects,
    /// `other` never runs.
    pub fn and<B>(self, other: Task<B, E>) -> Task<(A, B), E>
    where
        B: Send + 'static,
    {
        Task::new(move |resolve: Resolve<(A, B)>, reject: Reject<E>| {
            let other = other.clone();
            let next_reject = Arc::clone(&reject);
            self.run_with(
                Arc::new(move |first| {
                    let first = Mutex::new(Some(first));
                    let resolve = Arc::clone(&resolve);
                    other.run_with(
                        Arc::new(move |second| {
                            if let Some(first) = first.lock().take() {
                                resolve((first, second));
                            }
                        }),
                        Arc::clone(&next_reject),
                    );
                }),
                reject,
            );
        })
    }

    /// Runs a list of tasks in order and resolves with their results.
    ///
    /// Behaves like a left fold of [`Task::and`] starting from an empty list:
    /// task `i + 1` starts only after task `i` has resolved, and the first
    /// rejection stops the sequence. An empty list resolves to an empty list.
    ///
    /// The tasks are driven by a loop rather than nested callbacks, so tasks
    /// that resolve synchronously do not grow the stack.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::effect::Task;
    ///
    /// let many = Task::<usize, ()>::all((0..100_000).map(Task::of));
    /// many.run(|values| assert_eq!(values.len(), 100_000), |_| {});
    /// ```
    pub fn all<I>(tasks: I) -> Task<Vec<A>, E>
    where
        I: IntoIterator<Item = Self>,
    {
        let tasks: Arc<[Self]> = tasks.into_iter().collect();
        Task::new(move |resolve, reject| {
            Arc::new(Sequence::new(Arc::clone(&tasks), resolve, reject)).drive();
        })
    }

    /// Changes the scheduling discipline to concurrent composition.
    pub fn into_parallel(self) -> Parallel<A, E> {
        Parallel::new(move |resolve, reject| self.run_with(resolve, reject))
    }
}

impl<F: Send + 'static, E: Send + 'static> Task<F, E> {
    /// Applies the resolved function to the resolved value.
    ///
    /// The function task runs first; the value task starts once it resolved.
    pub fn ap<V, B>(self, values: Task<V, E>) -> Task<B, E>
    where
        F: FnOnce(V) -> B,
        V: Send + 'static,
        B: Send + 'static,
    {
        self.and(values).map(|(function, value)| function(value))
    }
}

#[cfg(feature = "tagged")]
impl<A, E> Tagged for Task<A, E> {
    const TYPE_NAME: &'static str = "Task";

    fn tag(&self) -> Option<&str> {
        None
    }
}

impl<A, E> fmt::Debug for Task<A, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Task").field(&"<recipe>").finish()
    }
}

static_assertions::assert_impl_all!(Task<i32, String>: Send, Sync, Clone);

/// Driver state for one run of [`Task::all`].
///
/// Exactly one thread drives at a time. A task that resolves while the
/// driver is still inside its recipe only records the value and sets
/// `resumed`; the driver then moves on to the next task. A task that
/// resolves after the driver went idle takes over driving itself.
struct Sequence<A, E> {
    tasks: Arc<[Task<A, E>]>,
    cursor: Mutex<Cursor<A>>,
    resolve: Resolve<Vec<A>>,
    reject: Reject<E>,
}

struct Cursor<A> {
    values: Vec<A>,
    driving: bool,
    resumed: bool,
}

impl<A: Send + 'static, E: Send + 'static> Sequence<A, E> {
    fn new(tasks: Arc<[Task<A, E>]>, resolve: Resolve<Vec<A>>, reject: Reject<E>) -> Self {
        let capacity = tasks.len();
        Self {
            tasks,
            cursor: Mutex::new(Cursor {
                values: Vec::with_capacity(capacity),
                driving: false,
                resumed: false,
            }),
            resolve,
            reject,
        }
    }

    fn drive(self: &Arc<Self>) {
        tail_rec((), |()| {
            let index = {
                let mut cursor = self.cursor.lock();
                cursor.driving = true;
                cursor.resumed = false;
                cursor.values.len()
            };

            let Some(task) = self.tasks.get(index) else {
                let values = std::mem::take(&mut self.cursor.lock().values);
                (self.resolve)(values);
                return Step::Done(());
            };

            let sequence = Arc::clone(self);
            task.run_with(
                Arc::new(move |value| sequence.advance(value)),
                Arc::clone(&self.reject),
            );

            let mut cursor = self.cursor.lock();
            if cursor.resumed {
                Step::Continue(())
            } else {
                cursor.driving = false;
                Step::Done(())
            }
        });
    }

    fn advance(self: &Arc<Self>, value: A) {
        let idle = {
            let mut cursor = self.cursor.lock();
            cursor.values.push(value);
            if cursor.driving {
                cursor.resumed = true;
            }
            !cursor.driving
        };
        if idle {
            self.drive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn capture<A: Send + 'static, E: Send + 'static>(task: &Task<A, E>) -> Arc<Mutex<Vec<Result<A, E>>>> {
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let resolved = Arc::clone(&outcomes);
        let rejected = Arc::clone(&outcomes);
        task.run(
            move |value| resolved.lock().push(Ok(value)),
            move |error| rejected.lock().push(Err(error)),
        );
        outcomes
    }

    #[rstest]
    fn test_attempt_maps_result_to_callbacks() {
        let ok = Task::<i32, String>::attempt(|| Ok(1));
        let err = Task::<i32, String>::attempt(|| Err("bad".to_string()));
        assert_eq!(*capture(&ok).lock(), vec![Ok(1)]);
        assert_eq!(*capture(&err).lock(), vec![Err("bad".to_string())]);
    }

    #[rstest]
    fn test_and_pairs_once_when_second_resolves_twice() {
        let twice: Task<i32, ()> = Task::new(|resolve, _| {
            resolve(2);
            resolve(3);
        });
        let task = Task::of(1).and(twice);
        assert_eq!(*capture(&task).lock(), vec![Ok((1, 2))]);
    }

    #[rstest]
    fn test_all_resumes_after_deferred_resolution() {
        let held: Arc<Mutex<Option<Resolve<i32>>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&held);
        let deferred: Task<i32, ()> = Task::new(move |resolve, _| *slot.lock() = Some(resolve));
        let task = Task::all(vec![Task::of(1), deferred, Task::of(3), Task::of(4)]);

        let outcomes = capture(&task);
        assert!(outcomes.lock().is_empty());

        let resolve = held.lock().take().unwrap();
        resolve(2);
        assert_eq!(*outcomes.lock(), vec![Ok(vec![1, 2, 3, 4])]);
    }

    #[rstest]
    fn test_all_resolves_once_per_run() {
        let task = Task::<i32, ()>::all(vec![Task::of(1), Task::of(2)]);
        assert_eq!(*capture(&task).lock(), vec![Ok(vec![1, 2])]);
        assert_eq!(*capture(&task).lock(), vec![Ok(vec![1, 2])]);
    }

    #[rstest]
    fn test_chain_adopts_inner_rejection() {
        let task = Task::<i32, &str>::of(1).chain(|_| Task::<i32, &str>::reject("inner"));
        assert_eq!(*capture(&task).lock(), vec![Err("inner")]);
    }

    #[rstest]
    fn test_into_parallel_keeps_outcome() {
        let parallel = Task::<i32, ()>::of(5).into_parallel();
        let outcome = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&outcome);
        parallel.run(move |value| *sink.lock() = Some(value), |_| {});
        assert_eq!(*outcome.lock(), Some(5));
    }
}
