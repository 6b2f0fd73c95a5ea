//! Error types for awaiting deferred actions.
//!
//! Rejection is an ordinary value inside the callback protocol. It only
//! becomes an error when a recipe is awaited as a Rust future, where the
//! outcome is folded into a `Result`.

use std::fmt;

/// Represents the failed outcome of awaiting a deferred action.
///
/// # Examples
///
/// ```rust
/// use deferral::effect::SettlementError;
///
/// let error: SettlementError<String> = SettlementError::Rejected("timeout".to_string());
/// assert_eq!(format!("{error}"), "deferred action rejected: timeout");
///
/// let abandoned: SettlementError<String> = SettlementError::Abandoned;
/// assert_eq!(
///     format!("{abandoned}"),
///     "deferred action dropped its callbacks without settling"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementError<E> {
    /// The recipe called `reject` with this value.
    Rejected(E),
    /// Every callback was dropped before either one fired.
    Abandoned,
}

impl<E> SettlementError<E> {
    /// Returns the rejection value, if the action rejected.
    pub fn rejected(self) -> Option<E> {
        match self {
            Self::Rejected(error) => Some(error),
            Self::Abandoned => None,
        }
    }

    /// Returns `true` if the action dropped its callbacks without settling.
    pub const fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned)
    }
}

impl<E: fmt::Display> fmt::Display for SettlementError<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(error) => write!(formatter, "deferred action rejected: {error}"),
            Self::Abandoned => write!(
                formatter,
                "deferred action dropped its callbacks without settling"
            ),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for SettlementError<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_accessor() {
        assert_eq!(SettlementError::Rejected(3).rejected(), Some(3));
        assert_eq!(SettlementError::<i32>::Abandoned.rejected(), None);
    }

    #[test]
    fn test_is_abandoned() {
        assert!(SettlementError::<()>::Abandoned.is_abandoned());
        assert!(!SettlementError::Rejected(()).is_abandoned());
    }

    #[test]
    fn test_error_source_is_none() {
        use std::error::Error;
        let error = SettlementError::Rejected("disk full".to_string());
        assert!(error.source().is_none());
    }
}
