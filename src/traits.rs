use crate::descriptor::PathDescriptor;

/// Decides whether a path is included in an operation.
///
/// Implemented by every elementary [`Test`](crate::Test), by the composite
/// [`Predicate`](crate::Predicate), and by any `Fn(&PathDescriptor) -> bool`
/// closure, so callers can mix built-in filters with their own.
///
/// Implementations must not fail: a test that cannot be evaluated (for
/// example a timestamp check on a path that vanished) returns `false`.
///
/// # Example
///
/// ```rust
/// use treeplan::{Matcher, PathDescriptor};
///
/// struct XmlOnly;
///
/// impl Matcher for XmlOnly {
///     fn is_match(&self, desc: &PathDescriptor) -> bool {
///         desc.extension_upper() == ".XML"
///     }
/// }
///
/// assert!(XmlOnly.is_match(&PathDescriptor::new("/data/feed.xml")));
/// assert!(!XmlOnly.is_match(&PathDescriptor::new("/data/feed.json")));
/// ```
pub trait Matcher {
    /// Returns `true` if this path should be included.
    fn is_match(&self, desc: &PathDescriptor) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&PathDescriptor) -> bool,
{
    fn is_match(&self, desc: &PathDescriptor) -> bool {
        self(desc)
    }
}
