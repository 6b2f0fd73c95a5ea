//! One-way settlement latch.
//!
//! A deferred action settles at most once. Every run of a recipe gets its own
//! [`SettlementLatch`]; the first resolve or reject moves it out of
//! `Pending` with a compare-and-swap, and every later callback invocation
//! observes a settled latch and is discarded.
//!
//! Built with `--features loom` and `RUSTFLAGS="--cfg loom"`, the latch uses
//! loom's atomics so its transitions can be model checked.

#[cfg(all(feature = "loom", loom))]
use loom::sync::atomic::{AtomicU8, Ordering};
#[cfg(not(all(feature = "loom", loom)))]
use std::sync::atomic::{AtomicU8, Ordering};

use std::fmt;

const STATE_PENDING: u8 = 0;
const STATE_RESOLVED: u8 = 1;
const STATE_REJECTED: u8 = 2;

/// Observable state of a [`SettlementLatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Settlement {
    /// Neither callback has fired.
    Pending,
    /// The resolve callback fired first.
    Resolved,
    /// The reject callback fired first.
    Rejected,
}

impl Settlement {
    /// Returns `true` unless the latch is still pending.
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// An atomic pending → resolved | rejected latch.
///
/// # Examples
///
/// ```rust
/// use deferral::effect::{Settlement, SettlementLatch};
///
/// let latch = SettlementLatch::new();
/// assert!(latch.try_reject());
/// assert!(!latch.try_resolve());
/// assert_eq!(latch.state(), Settlement::Rejected);
/// ```
pub struct SettlementLatch {
    state: AtomicU8,
}

impl SettlementLatch {
    /// Creates a pending latch.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_PENDING),
        }
    }

    /// Settles as resolved. Returns `false` if the latch was already settled.
    pub fn try_resolve(&self) -> bool {
        self.transition(STATE_RESOLVED)
    }

    /// Settles as rejected. Returns `false` if the latch was already settled.
    pub fn try_reject(&self) -> bool {
        self.transition(STATE_REJECTED)
    }

    /// Returns the current state.
    pub fn state(&self) -> Settlement {
        match self.state.load(Ordering::Acquire) {
            STATE_PENDING => Settlement::Pending,
            STATE_RESOLVED => Settlement::Resolved,
            _ => Settlement::Rejected,
        }
    }

    /// Returns `true` once either transition has happened.
    pub fn is_settled(&self) -> bool {
        self.state().is_settled()
    }

    fn transition(&self, target: u8) -> bool {
        self.state
            .compare_exchange(STATE_PENDING, target, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for SettlementLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SettlementLatch {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SettlementLatch")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::thread;

    #[rstest]
    fn test_new_latch_is_pending() {
        let latch = SettlementLatch::new();
        assert_eq!(latch.state(), Settlement::Pending);
        assert!(!latch.is_settled());
    }

    #[rstest]
    fn test_first_resolve_wins() {
        let latch = SettlementLatch::new();
        assert!(latch.try_resolve());
        assert!(!latch.try_resolve());
        assert!(!latch.try_reject());
        assert_eq!(latch.state(), Settlement::Resolved);
    }

    #[rstest]
    fn test_concurrent_transitions_settle_once() {
        for _ in 0..100 {
            let latch = Arc::new(SettlementLatch::new());
            let handles: Vec<_> = (0..8)
                .map(|index| {
                    let latch = Arc::clone(&latch);
                    thread::spawn(move || {
                        if index % 2 == 0 {
                            latch.try_resolve()
                        } else {
                            latch.try_reject()
                        }
                    })
                })
                .collect();

            let winners = handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(winners, 1);
            assert!(latch.is_settled());
        }
    }
}
