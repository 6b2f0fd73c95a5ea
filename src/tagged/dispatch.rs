//! Dispatch of tagged values by variant tag.

use std::fmt;

use super::{TaggedValue, UnionError};

type Handler<'a, P, R> = Box<dyn Fn(P) -> R + Send + Sync + 'a>;

/// A dispatch table from variant tags to handlers for one union type.
///
/// A table is built for a single type name. Dispatching a value of another
/// type fails with [`UnionError::InvalidType`]; dispatching a variant that has
/// no handler fails with [`UnionError::InvalidTag`]. Single-case record
/// values carry no tag and are dispatched under their type name.
///
/// Tables are reusable: handlers are `Fn`, so one table can dispatch any
/// number of values.
///
/// # Examples
///
/// ```rust
/// use deferral::tagged::{MatchTable, TaggedValue, UnionError};
///
/// let table = MatchTable::new("Either")
///     .on("Left", |error: String| format!("failed: {error}"))
///     .on("Right", |value: String| value);
///
/// let left = TaggedValue::variant("Either", "Left", "boom".to_string());
/// assert_eq!(table.dispatch(left), Ok("failed: boom".to_string()));
///
/// let other = TaggedValue::variant("Option", "Some", "x".to_string());
/// assert!(matches!(table.dispatch(other), Err(UnionError::InvalidType { .. })));
/// ```
pub struct MatchTable<'a, P, R> {
    type_name: &'static str,
    handlers: Vec<(&'static str, Handler<'a, P, R>)>,
}

impl<'a, P, R> MatchTable<'a, P, R> {
    /// Creates an empty table for the union type `type_name`.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            handlers: Vec::new(),
        }
    }

    /// Registers `handler` for the variant `tag`.
    ///
    /// Registering the same tag twice replaces the earlier handler.
    #[must_use]
    pub fn on<F>(mut self, tag: &'static str, handler: F) -> Self
    where
        F: Fn(P) -> R + Send + Sync + 'a,
    {
        let handler: Handler<'a, P, R> = Box::new(handler);
        match self.handlers.iter_mut().find(|(existing, _)| *existing == tag) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((tag, handler)),
        }
        self
    }

    /// Returns the type name this table dispatches.
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if a handler is registered for `tag`.
    pub fn handles(&self, tag: &str) -> bool {
        self.handler(tag).is_some()
    }

    /// Returns the registered tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|(tag, _)| *tag)
    }

    /// Dispatches `value` to the handler for its active tag.
    ///
    /// # Errors
    ///
    /// - [`UnionError::InvalidType`] if `value` is not of this table's type
    /// - [`UnionError::InvalidTag`] if no handler is registered for its tag
    pub fn dispatch(&self, value: TaggedValue<P>) -> Result<R, UnionError> {
        self.check_type(&value)?;
        let tag = self.active_tag(&value).to_owned();
        let handler = self.handler(&tag).ok_or_else(|| UnionError::InvalidTag {
            type_name: self.type_name,
            tag,
        })?;
        Ok(handler(value.into_payload()))
    }

    fn handler(&self, tag: &str) -> Option<&Handler<'a, P, R>> {
        self.handlers
            .iter()
            .find(|(registered, _)| *registered == tag)
            .map(|(_, handler)| handler)
    }

    fn check_type<Q>(&self, value: &TaggedValue<Q>) -> Result<(), UnionError> {
        if value.is_type(self.type_name) {
            Ok(())
        } else {
            Err(UnionError::InvalidType {
                expected: self.type_name,
                found: value.type_name().to_owned(),
            })
        }
    }

    fn active_tag<'v, Q>(&self, value: &'v TaggedValue<Q>) -> &'v str {
        value.tag().unwrap_or_else(|| value.type_name())
    }
}

impl<P, R> fmt::Debug for MatchTable<'_, P, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MatchTable")
            .field("type_name", &self.type_name)
            .field("tags", &self.tags().collect::<Vec<_>>())
            .finish()
    }
}

/// Dispatches `value` through `table`.
///
/// Free-function form of [`MatchTable::dispatch`].
///
/// # Errors
///
/// See [`MatchTable::dispatch`].
pub fn match_tagged<P, R>(value: TaggedValue<P>, table: &MatchTable<'_, P, R>) -> Result<R, UnionError> {
    table.dispatch(value)
}

/// Dispatches two values of the same union type that must share a variant.
///
/// The handler for the common tag receives both payloads as a pair.
///
/// # Errors
///
/// - [`UnionError::InvalidType`] if either value is not of the table's type
/// - [`UnionError::InvalidTag`] if either tag has no handler
/// - [`UnionError::TagMismatch`] if the two tags differ
///
/// # Examples
///
/// ```rust
/// use deferral::tagged::{MatchTable, TaggedValue, UnionError, match_pair};
///
/// let table = MatchTable::new("Option")
///     .on("Some", |(x, y): (i32, i32)| Some(x + y))
///     .on("None", |_| None);
///
/// let sum = match_pair(
///     TaggedValue::variant("Option", "Some", 1),
///     TaggedValue::variant("Option", "Some", 2),
///     &table,
/// );
/// assert_eq!(sum, Ok(Some(3)));
///
/// let mismatch = match_pair(
///     TaggedValue::variant("Option", "Some", 1),
///     TaggedValue::variant("Option", "None", 0),
///     &table,
/// );
/// assert!(matches!(mismatch, Err(UnionError::TagMismatch { .. })));
/// ```
pub fn match_pair<P, R>(
    left: TaggedValue<P>,
    right: TaggedValue<P>,
    table: &MatchTable<'_, (P, P), R>,
) -> Result<R, UnionError> {
    table.check_type(&left)?;
    table.check_type(&right)?;

    let left_tag = table.active_tag(&left).to_owned();
    let right_tag = table.active_tag(&right).to_owned();
    for tag in [&left_tag, &right_tag] {
        if !table.handles(tag) {
            return Err(UnionError::InvalidTag {
                type_name: table.type_name,
                tag: tag.clone(),
            });
        }
    }
    if left_tag != right_tag {
        return Err(UnionError::TagMismatch {
            left: left_tag,
            right: right_tag,
        });
    }

    let handler = table.handler(&left_tag).ok_or_else(|| UnionError::InvalidTag {
        type_name: table.type_name,
        tag: left_tag.clone(),
    })?;
    Ok(handler((left.into_payload(), right.into_payload())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn option_table() -> MatchTable<'static, i32, String> {
        MatchTable::new("Option")
            .on("Some", |value| format!("some {value}"))
            .on("None", |_| "none".to_string())
    }

    #[rstest]
    fn test_dispatch_selects_handler_by_tag() {
        let table = option_table();
        assert_eq!(
            table.dispatch(TaggedValue::variant("Option", "Some", 7)),
            Ok("some 7".to_string())
        );
        assert_eq!(
            table.dispatch(TaggedValue::variant("Option", "None", 0)),
            Ok("none".to_string())
        );
    }

    #[rstest]
    fn test_dispatch_rejects_foreign_type() {
        let result = option_table().dispatch(TaggedValue::variant("Either", "Some", 1));
        assert_eq!(
            result,
            Err(UnionError::InvalidType {
                expected: "Option",
                found: "Either".to_string(),
            })
        );
    }

    #[rstest]
    fn test_dispatch_rejects_unhandled_tag() {
        let result = option_table().dispatch(TaggedValue::variant("Option", "Maybe", 1));
        assert_eq!(
            result,
            Err(UnionError::InvalidTag {
                type_name: "Option",
                tag: "Maybe".to_string(),
            })
        );
    }

    #[rstest]
    fn test_record_dispatches_under_type_name() {
        let table = MatchTable::new("Lens").on("Lens", |focus: &str| focus.len());
        assert_eq!(table.dispatch(TaggedValue::single("Lens", "name")), Ok(4));
    }

    #[rstest]
    fn test_on_replaces_existing_handler() {
        let table = option_table().on("None", |_| "nothing".to_string());
        assert_eq!(table.tags().collect::<Vec<_>>(), vec!["Some", "None"]);
        assert_eq!(
            table.dispatch(TaggedValue::variant("Option", "None", 0)),
            Ok("nothing".to_string())
        );
    }

    #[rstest]
    fn test_match_pair_reports_unhandled_tag_before_mismatch() {
        let table: MatchTable<'_, (i32, i32), i32> = MatchTable::new("Option").on("Some", |(x, y)| x * y);
        let result = match_pair(
            TaggedValue::variant("Option", "Some", 2),
            TaggedValue::variant("Option", "None", 0),
            &table,
        );
        assert_eq!(
            result,
            Err(UnionError::InvalidTag {
                type_name: "Option",
                tag: "None".to_string(),
            })
        );
    }
}
