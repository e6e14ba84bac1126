//! Leaven Value - the dynamic value model and input-visitor abstraction.
//!
//! Expansion reads loosely-structured input (scalars, lists, keyed maps)
//! through a read-only cursor, the [`Visitor`], and produces strongly-typed
//! [`Value`]s. Two visitor backings are provided:
//! - [`ValueVisitor`] over native [`Value`] trees (the output of a prior
//!   generic deserialization step)
//! - [`JsonVisitor`] over opaque `serde_json::Value` documents
//!
//! Both expose the identical contract; handlers never know which backing
//! they are traversing.
//!
//! # The list/object ambiguity
//!
//! Containers are a single insertion-ordered map ([`Entries`]) whose keys
//! may be integers or strings. A container whose keys are exactly `0..n`
//! in order is a list, *including the empty case* — an empty container
//! answers true to both `is_list` and `is_object`. Call sites depend on
//! this exact rule; do not "improve" it.

mod json;
mod native;
mod value;
mod visitor;

pub use json::JsonVisitor;
pub use native::ValueVisitor;
pub use value::{Entries, Key, Record, Value};
pub use visitor::{Visitor, VisitorRef};
