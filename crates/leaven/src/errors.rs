//! Error types for expansion.
//!
//! Validation never produces these: a validation probe only answers false.
//! Errors surface where a value (or a schema, or a handler) was actually
//! requested.

use thiserror::Error;

/// An expansion request that could not be satisfied.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// The type expression itself does not parse.
    #[error(transparent)]
    Malformed(#[from] leaven_expr::ParseError),

    /// The named unit has no usable construction strategy, or is unknown
    /// altogether. A compile-time condition, not a per-input failure.
    #[error("no expansion support for `{name}`: {reasons}")]
    Unsupported { name: String, reasons: String },

    /// No construction strategy matched this specific input.
    #[error("cannot expand input into `{type_name}`: {reason}")]
    NoMatch { type_name: String, reason: String },

    /// A leaf handler accepted the input during validation but its parse
    /// disagreed. Validate and parse share one code path precisely so
    /// this stays unreachable; seeing it is an internal-consistency bug.
    #[error("`{type_name}` accepted the input but failed to parse it: {reason}")]
    Format { type_name: String, reason: String },
}

impl ExpandError {
    pub(crate) fn unsupported(name: impl Into<String>, reasons: Vec<String>) -> Self {
        ExpandError::Unsupported { name: name.into(), reasons: reasons.join("; ") }
    }

    pub(crate) fn no_match(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ExpandError::NoMatch { type_name: type_name.into(), reason: reason.into() }
    }

    pub(crate) fn format(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ExpandError::Format { type_name: type_name.into(), reason: reason.into() }
    }
}
