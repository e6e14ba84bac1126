//! Parse errors for type expressions.

use thiserror::Error;

/// A malformed type expression.
///
/// Surfaced immediately and never retried; an expression that fails to
/// parse once will fail the same way every time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The expression opened a generic argument list that never closes.
    #[error("type expression `{text}` is missing a closing `>`")]
    UnclosedGenerics { text: String },

    /// An identifier was expected but none was found.
    #[error("type expression `{text}` has an empty type name")]
    EmptyName { text: String },

    /// Input remained after a complete expression.
    #[error("type expression `{text}` has trailing input after position {at}")]
    TrailingInput { text: String, at: usize },

    /// A delimiter appeared where it makes no sense, e.g. `A<>` or `A,B`
    /// at the top level of a single expression.
    #[error("unexpected `{found}` in type expression `{text}`")]
    UnexpectedToken { text: String, found: char },
}

impl ParseError {
    pub(crate) fn unclosed(text: &str) -> Self {
        ParseError::UnclosedGenerics { text: text.to_owned() }
    }

    pub(crate) fn empty(text: &str) -> Self {
        ParseError::EmptyName { text: text.to_owned() }
    }

    pub(crate) fn trailing(text: &str, at: usize) -> Self {
        ParseError::TrailingInput { text: text.to_owned(), at }
    }

    pub(crate) fn unexpected(text: &str, found: char) -> Self {
        ParseError::UnexpectedToken { text: text.to_owned(), found }
    }
}
