//! Derive macro for the `deferral` crate's `Tagged` trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use deferral::tagged::Tagged;
//!
//! #[derive(Tagged)]
//! enum Shape {
//!     Circle(f64),
//!     Rectangle { width: f64, height: f64 },
//!     Point,
//! }
//!
//! assert_eq!(Shape::TYPE_NAME, "Shape");
//! assert_eq!(Shape::TAGS, &["Circle", "Rectangle", "Point"]);
//! assert_eq!(Shape::Point.tag(), Some("Point"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod tagged;

use proc_macro::TokenStream;

/// Derive macro implementing `deferral::tagged::Tagged`.
///
/// # Generated Code
///
/// For an enum, `TYPE_NAME` is the enum's name, `TAGS` lists the variant
/// names in declaration order and `tag` returns the active variant's name:
///
/// ```rust,ignore
/// impl Tagged for Shape {
///     const TYPE_NAME: &'static str = "Shape";
///     const TAGS: &'static [&'static str] = &["Circle", "Rectangle", "Point"];
///     fn tag(&self) -> Option<&str> { ... }
/// }
/// ```
///
/// For a struct, `TYPE_NAME` is the struct's name, `TAGS` is empty and `tag`
/// returns `None`.
///
/// # Errors
///
/// Deriving on a `union` is a compile error.
///
/// # Generics
///
/// Generic parameters and where clauses are carried over to the impl.
#[proc_macro_derive(Tagged)]
pub fn derive_tagged(input: TokenStream) -> TokenStream {
    tagged::derive_tagged_impl(input)
}
