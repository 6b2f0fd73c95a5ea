//! Tagged values: runtime type and variant discriminants.
//!
//! Every data type in this crate is a native Rust enum or struct, so variant
//! access is checked by the compiler. What remains at runtime is
//! introspection (which type, which variant) and the dynamic boundary where a
//! value arrives as a `(type name, tag, payload)` triple and must be
//! dispatched to a handler.
//!
//! - [`Tagged`]: type name and active tag of a native value
//! - [`TaggedValue`]: the dynamic `(type, tag, payload)` record
//! - [`union`] and [`record`]: constructor factories for tagged values
//! - [`MatchTable`], [`match_tagged`], [`match_pair`]: dispatch by tag
//! - [`MemoRecord`]: a single-case value whose payload is computed on demand
//!
//! # Examples
//!
//! ```rust
//! use deferral::tagged::{MatchTable, union};
//!
//! let option = union("Option");
//! let some = option("Some", 5);
//! let none = option("None", 0);
//!
//! let table = MatchTable::new("Option")
//!     .on("Some", |value: i32| value * 2)
//!     .on("None", |_| -1);
//!
//! assert_eq!(table.dispatch(some), Ok(10));
//! assert_eq!(table.dispatch(none), Ok(-1));
//! ```

mod dispatch;
mod error;
mod memo;

pub use dispatch::{MatchTable, match_pair, match_tagged};
pub use error::UnionError;
pub use memo::{MemoRecord, record_memo};

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Runtime introspection for values that belong to a named data type.
///
/// Implement it by hand or with `#[derive(Tagged)]` (feature `derive`).
///
/// # Examples
///
/// ```rust
/// use deferral::tagged::Tagged;
///
/// enum Shape {
///     Circle(f64),
///     Square(f64),
/// }
///
/// impl Tagged for Shape {
///     const TYPE_NAME: &'static str = "Shape";
///     const TAGS: &'static [&'static str] = &["Circle", "Square"];
///
///     fn tag(&self) -> Option<&str> {
///         match self {
///             Self::Circle(_) => Some("Circle"),
///             Self::Square(_) => Some("Square"),
///         }
///     }
/// }
///
/// assert_eq!(Shape::Circle(1.0).tag(), Some("Circle"));
/// assert_eq!(deferral::tagged::introspect(&Shape::Square(2.0)), "Shape");
/// ```
pub trait Tagged {
    /// The name of the data type.
    const TYPE_NAME: &'static str;

    /// The variant tags of a union type, in declaration order.
    ///
    /// Single-case (struct) types have no tags.
    const TAGS: &'static [&'static str] = &[];

    /// The active variant tag, or `None` for single-case types.
    fn tag(&self) -> Option<&str>;

    /// The type name of this value.
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }
}

/// Returns the type name of a tagged value.
///
/// # Examples
///
/// ```rust
/// use deferral::tagged::{introspect, union};
///
/// assert_eq!(introspect(&union("Either")("Left", 1)), "Either");
/// ```
pub fn introspect<T: Tagged>(value: &T) -> &str {
    value.type_name()
}

/// A dynamically tagged value.
///
/// Carries a type name, an optional variant tag (absent for single-case
/// record types) and exactly one payload. Values are immutable once built;
/// the payload is only reachable through [`into_payload`](Self::into_payload)
/// after the caller has checked the type and tag, or through a
/// [`MatchTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaggedValue<P> {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    type_name: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    tag: Option<String>,
    payload: P,
}

impl<P> TaggedValue<P> {
    /// Creates a union value with the given type name and variant tag.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::tagged::TaggedValue;
    ///
    /// let value = TaggedValue::variant("Either", "Right", 42);
    /// assert_eq!(value.type_name(), "Either");
    /// assert_eq!(value.tag(), Some("Right"));
    /// ```
    pub fn variant(type_name: impl Into<String>, tag: impl Into<String>, payload: P) -> Self {
        Self {
            type_name: type_name.into(),
            tag: Some(tag.into()),
            payload,
        }
    }

    /// Creates a single-case record value with the given type name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::tagged::TaggedValue;
    ///
    /// let value = TaggedValue::single("Lens", "focus");
    /// assert_eq!(value.tag(), None);
    /// assert_eq!(value.into_payload(), "focus");
    /// ```
    pub fn single(type_name: impl Into<String>, payload: P) -> Self {
        Self {
            type_name: type_name.into(),
            tag: None,
            payload,
        }
    }

    /// Returns the declared type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the variant tag, if this is a union value.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Returns a reference to the payload.
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// Consumes the value and returns its payload.
    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Returns `true` if the value is declared as `type_name`.
    pub fn is_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }

    /// Transforms the payload, keeping type name and tag.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::tagged::TaggedValue;
    ///
    /// let value = TaggedValue::variant("Option", "Some", 20).map_payload(|x| x + 1);
    /// assert_eq!(value.into_payload(), 21);
    /// ```
    pub fn map_payload<Q, F>(self, function: F) -> TaggedValue<Q>
    where
        F: FnOnce(P) -> Q,
    {
        TaggedValue {
            type_name: self.type_name,
            tag: self.tag,
            payload: function(self.payload),
        }
    }
}

/// Returns a constructor for variants of the union type `type_name`.
///
/// The constructor takes the variant tag and the payload.
///
/// # Examples
///
/// ```rust
/// use deferral::tagged::union;
///
/// let either = union("Either");
/// let left = either("Left", "error");
/// assert_eq!(left.type_name(), "Either");
/// assert_eq!(left.tag(), Some("Left"));
/// ```
pub fn union<P>(type_name: &'static str) -> impl Fn(&str, P) -> TaggedValue<P> + Clone {
    move |tag, payload| TaggedValue::variant(type_name, tag, payload)
}

/// Builds a constructor for the single-case record type `type_name`.
///
/// `build` receives the inner constructor (`payload -> TaggedValue`) and
/// returns the public constructor, which lets several arguments be folded into
/// one payload before the value is produced.
///
/// # Examples
///
/// ```rust
/// use deferral::tagged::record;
///
/// let pair = record("Pair", |make| move |first: i32, second: i32| make((first, second)));
/// let value = pair(1, 2);
/// assert_eq!(value.type_name(), "Pair");
/// assert_eq!(value.into_payload(), (1, 2));
/// ```
pub fn record<P, C, B>(type_name: &'static str, build: B) -> C
where
    B: FnOnce(Arc<dyn Fn(P) -> TaggedValue<P> + Send + Sync>) -> C,
{
    build(Arc::new(move |payload| TaggedValue::single(type_name, payload)))
}

// `TYPE_NAME` names the dynamic carrier itself; instances report the type
// they were declared with.
impl<P> Tagged for TaggedValue<P> {
    const TYPE_NAME: &'static str = "TaggedValue";

    fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }
}
