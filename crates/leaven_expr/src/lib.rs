//! Leaven Expr - the generic type-expression language.
//!
//! Type expressions name the target of an expansion: a base identifier with
//! optional ordered generic arguments, e.g. `Service<Endpoint<string>>` or
//! `map<string,int>`. This crate provides:
//! - `TypeExpr`, the parsed tree with a canonical string form
//! - `parse` / `parse_union`, the text grammar including type-variable
//!   substitution
//! - `Bindings`, the per-resolution map from variable name to bound
//!   expression
//!
//! Canonical forms are the identity keys used everywhere else in the
//! engine: two expressions with the same canonical text behave identically
//! during one expansion, so parsing must be deterministic and
//! side-effect-free.

mod error;
mod expr;
mod parse;

pub use error::ParseError;
pub use expr::{Bindings, TypeExpr};
pub use parse::{parse, parse_union};
