//! Error types for tagged-value dispatch.
//!
//! Dispatching a tagged value against a table that was built for a different
//! type, or that has no handler for the active variant, is a programming
//! error. Native enums rule it out at compile time; at dynamic boundaries
//! (decoding, FFI) it surfaces as a [`UnionError`].

use std::fmt;

/// Represents a failed dispatch of a tagged value.
///
/// # Examples
///
/// ```rust
/// use deferral::tagged::UnionError;
///
/// let error = UnionError::InvalidTag {
///     type_name: "Option",
///     tag: "Maybe".to_string(),
/// };
/// assert_eq!(format!("{error}"), "invalid tag: Option has no handler for `Maybe`");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionError {
    /// The value's declared type differs from the type the table expects.
    InvalidType {
        /// The type name the dispatch table was built for.
        expected: &'static str,
        /// The type name carried by the value.
        found: String,
    },
    /// The value's active variant has no handler.
    ///
    /// This is the unmatched-variant case reported by dynamic boundaries.
    InvalidTag {
        /// The type name of the value.
        type_name: &'static str,
        /// The unhandled variant tag.
        tag: String,
    },
    /// Two values dispatched together carry different variant tags.
    TagMismatch {
        /// The tag of the first value.
        left: String,
        /// The tag of the second value.
        right: String,
    },
}

impl fmt::Display for UnionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidType { expected, found } => {
                write!(formatter, "invalid type: expected {expected}, found {found}")
            }
            Self::InvalidTag { type_name, tag } => {
                write!(formatter, "invalid tag: {type_name} has no handler for `{tag}`")
            }
            Self::TagMismatch { left, right } => {
                write!(formatter, "tag mismatch: `{left}` and `{right}`")
            }
        }
    }
}

impl std::error::Error for UnionError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        UnionError::InvalidType { expected: "Task", found: "Parallel".to_string() },
        "invalid type: expected Task, found Parallel"
    )]
    #[case(
        UnionError::InvalidTag { type_name: "Either", tag: "Middle".to_string() },
        "invalid tag: Either has no handler for `Middle`"
    )]
    #[case(
        UnionError::TagMismatch { left: "Left".to_string(), right: "Right".to_string() },
        "tag mismatch: `Left` and `Right`"
    )]
    fn test_union_error_display(#[case] error: UnionError, #[case] expected: &str) {
        assert_eq!(format!("{error}"), expected);
    }

    #[rstest]
    fn test_union_error_equality() {
        let first = UnionError::InvalidType {
            expected: "Task",
            found: "Lens".to_string(),
        };
        let second = first.clone();
        let third = UnionError::InvalidType {
            expected: "Parallel",
            found: "Lens".to_string(),
        };
        assert_eq!(first, second);
        assert_ne!(first, third);
    }
}
