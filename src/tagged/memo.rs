//! Single-case tagged values with a memoized payload.

use std::cell::{Ref, RefCell};
use std::fmt;

use super::Tagged;

/// Evaluation state of a [`MemoRecord`] payload.
enum MemoState<P, F> {
    Unforced(F),
    Forced(P),
    Poisoned,
}

/// A single-case tagged value whose payload is computed on first access.
///
/// The thunk runs at most once; later accesses return the cached payload.
/// If the thunk panics the record is poisoned and every later access panics.
///
/// # Examples
///
/// ```rust
/// use deferral::tagged::{Tagged, record_memo};
/// use std::cell::Cell;
///
/// let calls = Cell::new(0);
/// let config = record_memo("Config", || {
///     calls.set(calls.get() + 1);
///     vec!["verbose", "color"]
/// });
///
/// assert_eq!(config.type_name(), "Config");
/// assert_eq!(calls.get(), 0);
/// assert_eq!(config.payload().len(), 2);
/// assert_eq!(config.payload().len(), 2);
/// assert_eq!(calls.get(), 1);
/// ```
pub struct MemoRecord<P, F = fn() -> P> {
    type_name: &'static str,
    state: RefCell<MemoState<P, F>>,
}

/// Creates a [`MemoRecord`] of type `type_name` from a payload thunk.
pub const fn record_memo<P, F>(type_name: &'static str, thunk: F) -> MemoRecord<P, F>
where
    F: FnOnce() -> P,
{
    MemoRecord {
        type_name,
        state: RefCell::new(MemoState::Unforced(thunk)),
    }
}

impl<P, F: FnOnce() -> P> MemoRecord<P, F> {
    /// Returns the payload, computing it on first access.
    ///
    /// # Panics
    ///
    /// Panics if the thunk panicked on an earlier access, or panics now.
    pub fn payload(&self) -> Ref<'_, P> {
        let needs_force = matches!(&*self.state.borrow(), MemoState::Unforced(_));
        if needs_force {
            self.force();
        }

        Ref::map(self.state.borrow(), |state| match state {
            MemoState::Forced(payload) => payload,
            MemoState::Unforced(_) | MemoState::Poisoned => {
                panic!("MemoRecord {} has been poisoned", self.type_name)
            }
        })
    }

    /// Returns `true` once the payload has been computed.
    pub fn is_forced(&self) -> bool {
        matches!(&*self.state.borrow(), MemoState::Forced(_))
    }

    /// Consumes the record and returns the payload, computing it if needed.
    ///
    /// # Panics
    ///
    /// Panics if the record is poisoned.
    pub fn into_payload(self) -> P {
        match self.state.into_inner() {
            MemoState::Unforced(thunk) => thunk(),
            MemoState::Forced(payload) => payload,
            MemoState::Poisoned => panic!("MemoRecord {} has been poisoned", self.type_name),
        }
    }

    fn force(&self) {
        // Poisoned while the thunk runs, so a panic leaves the record unusable.
        let previous = std::mem::replace(&mut *self.state.borrow_mut(), MemoState::Poisoned);
        if let MemoState::Unforced(thunk) = previous {
            let payload = thunk();
            *self.state.borrow_mut() = MemoState::Forced(payload);
        } else {
            *self.state.borrow_mut() = previous;
        }
    }
}

impl<P, F> Tagged for MemoRecord<P, F> {
    const TYPE_NAME: &'static str = "MemoRecord";

    fn tag(&self) -> Option<&str> {
        None
    }

    fn type_name(&self) -> &str {
        self.type_name
    }
}

impl<P: fmt::Debug, F> fmt::Debug for MemoRecord<P, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = formatter.debug_struct("MemoRecord");
        debug.field("type_name", &self.type_name);
        match &*self.state.borrow() {
            MemoState::Unforced(_) => debug.field("payload", &"<unforced>"),
            MemoState::Forced(payload) => debug.field("payload", payload),
            MemoState::Poisoned => debug.field("payload", &"<poisoned>"),
        };
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[rstest]
    fn test_payload_is_computed_once() {
        let calls = Cell::new(0);
        let record = record_memo("Counter", || {
            calls.set(calls.get() + 1);
            41 + 1
        });

        assert!(!record.is_forced());
        assert_eq!(*record.payload(), 42);
        assert_eq!(*record.payload(), 42);
        assert!(record.is_forced());
        assert_eq!(calls.get(), 1);
    }

    #[rstest]
    fn test_into_payload_without_access_runs_thunk() {
        let record = record_memo("Name", || "lazy".to_string());
        assert_eq!(record.into_payload(), "lazy");
    }

    #[rstest]
    fn test_panicking_thunk_poisons_record() {
        let record: MemoRecord<i32, _> = record_memo("Broken", || panic!("boom"));
        let first = catch_unwind(AssertUnwindSafe(|| *record.payload()));
        assert!(first.is_err());
        let second = catch_unwind(AssertUnwindSafe(|| *record.payload()));
        assert!(second.is_err());
    }

    #[rstest]
    fn test_debug_shows_forcing_state() {
        let record = record_memo("Debugged", || 7);
        assert!(format!("{record:?}").contains("<unforced>"));
        let _ = record.payload();
        assert!(format!("{record:?}").contains('7'));
    }
}
