//! The two-callback protocol shared by [`Parallel`](super::Parallel) and
//! [`Task`](super::Task).

use std::sync::Arc;

use super::latch::SettlementLatch;

/// Callback receiving the resolution value of a deferred action.
pub type Resolve<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Callback receiving the rejection value of a deferred action.
pub type Reject<E> = Arc<dyn Fn(E) + Send + Sync>;

/// A recipe: given `resolve` and `reject`, start the computation.
pub(crate) type Recipe<A, E> = Arc<dyn Fn(Resolve<A>, Reject<E>) + Send + Sync>;

/// The terminal callbacks of one run, behind that run's latch.
struct Settle<A, E> {
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    label: &'static str,
    latch: SettlementLatch,
    resolve: Resolve<A>,
    reject: Reject<E>,
}

impl<A, E> Settle<A, E> {
    fn resolve(&self, value: A) {
        if self.latch.try_resolve() {
            (self.resolve)(value);
        } else {
            self.discard("resolve");
        }
    }

    fn reject(&self, error: E) {
        if self.latch.try_reject() {
            (self.reject)(error);
        } else {
            self.discard("reject");
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables, clippy::unused_self))]
    fn discard(&self, outcome: &'static str) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            combinator = self.label,
            outcome,
            settled = ?self.latch.state(),
            "discarding late settlement"
        );
    }
}

/// Wraps `resolve`/`reject` so that at most one of them fires, at most once.
///
/// Called once per run of a recipe; the latch is never shared between runs.
pub(crate) fn guard<A, E>(label: &'static str, resolve: Resolve<A>, reject: Reject<E>) -> (Resolve<A>, Reject<E>)
where
    A: 'static,
    E: 'static,
{
    let settle = Arc::new(Settle {
        label,
        latch: SettlementLatch::new(),
        resolve,
        reject,
    });

    let on_resolve: Resolve<A> = {
        let settle = Arc::clone(&settle);
        Arc::new(move |value| settle.resolve(value))
    };
    let on_reject: Reject<E> = Arc::new(move |error| settle.reject(error));
    (on_resolve, on_reject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rstest::rstest;

    #[rstest]
    fn test_guard_forwards_only_first_settlement() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let resolved = Arc::clone(&log);
        let rejected = Arc::clone(&log);

        let (resolve, reject) = guard::<i32, &str>(
            "test",
            Arc::new(move |value| resolved.lock().push(format!("ok {value}"))),
            Arc::new(move |error| rejected.lock().push(format!("err {error}"))),
        );

        resolve(1);
        reject("late");
        resolve(2);

        assert_eq!(*log.lock(), vec!["ok 1".to_string()]);
    }

    #[rstest]
    fn test_guard_discards_everything_after_rejection() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let resolved = Arc::clone(&log);
        let rejected = Arc::clone(&log);

        let (resolve, reject) = guard::<i32, &str>(
            "test",
            Arc::new(move |value| resolved.lock().push(format!("ok {value}"))),
            Arc::new(move |error| rejected.lock().push(format!("err {error}"))),
        );

        reject("first");
        resolve(1);
        reject("second");

        assert_eq!(*log.lock(), vec!["err first".to_string()]);
    }
}
