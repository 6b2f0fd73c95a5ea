//! Bridges between recipes and Rust futures.
//!
//! - `Parallel` and `Task` implement [`IntoFuture`]: awaiting one runs its
//!   recipe once and yields the first settlement as a `Result`.
//! - [`Parallel::from_future`] and [`Task::from_future`] build a recipe that
//!   drives a fresh future on every run.
//!
//! # Examples
//!
//! ```rust
//! use deferral::effect::{SettlementError, Task};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let task = Task::<i32, String>::from_future(|| async { Ok(40) }).map(|x| x + 2);
//! assert_eq!(task.await, Ok(42));
//!
//! let failing = Task::<i32, String>::reject("offline".to_string());
//! assert_eq!(failing.await, Err(SettlementError::Rejected("offline".to_string())));
//! # }
//! ```

use std::future::{Future, IntoFuture};
use std::sync::{Arc, LazyLock};

use futures::channel::oneshot;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::runtime::{Builder, Handle, Runtime};

use super::callback::{Reject, Resolve};
use super::{Parallel, SettlementError, Task};

type Outcome<A, E> = Result<A, SettlementError<E>>;

/// Runs a recipe once and awaits its first settlement.
///
/// The recipe starts when the returned future is first polled. If every
/// callback is dropped without firing, the future yields
/// [`SettlementError::Abandoned`].
fn settle<A, E, R>(run: R) -> BoxFuture<'static, Outcome<A, E>>
where
    A: Send + 'static,
    E: Send + 'static,
    R: FnOnce(Resolve<A>, Reject<E>) + Send + 'static,
{
    Box::pin(async move {
        let (sender, receiver) = oneshot::channel::<Result<A, E>>();
        let sender = Arc::new(Mutex::new(Some(sender)));

        let on_resolve: Resolve<A> = {
            let sender = Arc::clone(&sender);
            Arc::new(move |value| {
                if let Some(sender) = sender.lock().take() {
                    let _ = sender.send(Ok(value));
                }
            })
        };
        let on_reject: Reject<E> = Arc::new(move |error| {
            if let Some(sender) = sender.lock().take() {
                let _ = sender.send(Err(error));
            }
        });

        run(on_resolve, on_reject);

        match receiver.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(SettlementError::Rejected(error)),
            Err(oneshot::Canceled) => Err(SettlementError::Abandoned),
        }
    })
}

/// Runtime for futures started outside of any tokio runtime.
///
/// Built on first use with at least two workers and never dropped. `None`
/// if the runtime could not be built.
static FALLBACK_RUNTIME: LazyLock<Option<Runtime>> = LazyLock::new(|| {
    let workers = std::thread::available_parallelism().map_or(2, |count| count.get().max(2));
    Builder::new_multi_thread()
        .worker_threads(workers)
        .thread_name("deferral-bridge")
        .enable_all()
        .build()
        .ok()
});

/// Starts `future` in the background and settles through the callbacks.
///
/// The future is spawned on the current tokio runtime, or on a shared
/// fallback runtime when called from outside one. Either way this returns
/// before the future completes, so sibling operands of a [`Parallel`]
/// combinator run concurrently.
fn drive<A, E, Fut>(future: Fut, resolve: Resolve<A>, reject: Reject<E>)
where
    A: Send + 'static,
    E: Send + 'static,
    Fut: Future<Output = Result<A, E>> + Send + 'static,
{
    let settle = async move {
        match future.await {
            Ok(value) => resolve(value),
            Err(error) => reject(error),
        }
    };

    if let Ok(handle) = Handle::try_current() {
        drop(handle.spawn(settle));
    } else if let Some(runtime) = FALLBACK_RUNTIME.as_ref() {
        drop(runtime.spawn(settle));
    } else {
        drop(std::thread::spawn(move || futures::executor::block_on(settle)));
    }
}

impl<A: Send + 'static, E: Send + 'static> IntoFuture for Parallel<A, E> {
    type Output = Outcome<A, E>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        settle(move |resolve, reject| self.run_with(resolve, reject))
    }
}

impl<A: Send + 'static, E: Send + 'static> IntoFuture for Task<A, E> {
    type Output = Outcome<A, E>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        settle(move |resolve, reject| self.run_with(resolve, reject))
    }
}

impl<A: Send + 'static, E: Send + 'static> Parallel<A, E> {
    /// Creates a `Parallel` that runs the future produced by `make` each
    /// time it is run.
    ///
    /// `Ok` resolves and `Err` rejects. The future is spawned on the current
    /// tokio runtime, or on a shared background runtime outside of one, so
    /// operands of [`Parallel::and`] make progress concurrently.
    pub fn from_future<M, Fut>(make: M) -> Self
    where
        M: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<A, E>> + Send + 'static,
    {
        Self::new(move |resolve, reject| drive(make(), resolve, reject))
    }
}

impl<A: Send + 'static, E: Send + 'static> Task<A, E> {
    /// Creates a `Task` that runs the future produced by `make` each time it
    /// is run.
    ///
    /// `Ok` resolves and `Err` rejects.
    pub fn from_future<M, Fut>(make: M) -> Self
    where
        M: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<A, E>> + Send + 'static,
    {
        Self::new(move |resolve, reject| drive(make(), resolve, reject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[tokio::test]
    async fn test_never_is_abandoned() {
        let outcome = Parallel::<i32, ()>::never().await;
        assert_eq!(outcome, Err(SettlementError::Abandoned));
    }

    #[rstest]
    #[tokio::test]
    async fn test_into_future_is_lazy() {
        let started = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&started);
        let task = Task::<i32, ()>::new(move |resolve, _| {
            *flag.lock() = true;
            resolve(1);
        });

        let future = task.into_future();
        assert!(!*started.lock());
        assert_eq!(future.await, Ok(1));
        assert!(*started.lock());
    }

    #[rstest]
    fn test_from_future_without_runtime_settles_in_background() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let sender = Mutex::new(sender);
        Task::<i32, ()>::from_future(|| async { Ok(9) }).run(
            move |value| {
                let _ = sender.lock().send(value);
            },
            |_| {},
        );
        assert_eq!(receiver.recv_timeout(Duration::from_secs(5)), Ok(9));
    }

    #[rstest]
    fn test_from_future_without_runtime_returns_before_completion() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let sender = Mutex::new(sender);
        let (release, gate) = futures::channel::oneshot::channel::<()>();
        let gate = Mutex::new(Some(gate));
        let task = Task::<i32, ()>::from_future(move || {
            let gate = gate.lock().take();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                Ok(1)
            }
        });

        task.run(
            move |value| {
                let _ = sender.lock().send(value);
            },
            |_| {},
        );
        assert!(receiver.try_recv().is_err());

        release.send(()).unwrap();
        assert_eq!(receiver.recv_timeout(Duration::from_secs(5)), Ok(1));
    }

    #[rstest]
    fn test_fallback_runtime_is_multi_threaded() {
        let runtime = FALLBACK_RUNTIME.as_ref().unwrap();
        assert_eq!(
            runtime.handle().runtime_flavor(),
            tokio::runtime::RuntimeFlavor::MultiThread
        );
    }
}
