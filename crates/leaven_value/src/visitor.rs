//! The read-only input cursor.

use std::sync::Arc;

use crate::value::Value;

/// Shared handle to a visitor position.
///
/// Child cursors are memoized per parent, so probing the same key twice
/// returns the identical handle (pointer equality holds).
pub type VisitorRef = Arc<dyn Visitor>;

/// A polymorphic read-only cursor over one input position.
///
/// The engine probes a position's type several times during strategy
/// selection before committing to expand it; implementations must answer
/// the predicates cheaply and memoize child cursors.
///
/// Predicates are not mutually exclusive: an empty container is both a
/// list and an object (see crate docs).
pub trait Visitor: Send + Sync {
    /// If the current value is null.
    fn is_null(&self) -> bool;

    /// If the current value is an integer.
    fn is_integer(&self) -> bool;

    /// If the current value is a float. Integers are not floats.
    fn is_float(&self) -> bool;

    /// If the current value is a boolean.
    fn is_bool(&self) -> bool;

    /// If the current value is a string.
    fn is_string(&self) -> bool;

    /// If the current value is a container of either shape (list or
    /// keyed map). This backs the builtin `array` type.
    fn is_array(&self) -> bool;

    /// If the current value is a keyed map position.
    fn is_object(&self) -> bool;

    /// If the current value is a list position (sequential keys from
    /// zero, including the empty case).
    fn is_list(&self) -> bool;

    /// The number of entries of a container position.
    fn length(&self) -> usize;

    /// The keys of an object position, stringified.
    fn keys(&self) -> Vec<String>;

    /// If there is an entry under `key`, *including* an explicit null.
    fn has_key(&self, key: &str) -> bool;

    /// The cursor for the object entry under `key`.
    ///
    /// Callers check `has_key` first; a missing key yields a null cursor.
    fn enter_object(&self, key: &str) -> VisitorRef;

    /// The cursor for the list entry at `index`.
    fn enter_array(&self, index: usize) -> VisitorRef;

    /// The raw value at this position, converted to the native model.
    fn value(&self) -> Value;
}

/// Memoization key for child cursors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ChildKey {
    Object(String),
    Index(usize),
}
