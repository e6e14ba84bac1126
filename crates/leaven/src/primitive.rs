//! Builtin primitive types.
//!
//! Primitives validate through direct visitor predicates and expand to the
//! raw input value; they never go through a handler lookup.

use leaven_value::Visitor;
use serde_json::json;

/// The builtin primitive type names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Null,
    Int,
    Float,
    Bool,
    String,
    /// Any container, list- or object-shaped.
    Array,
    /// Accepts anything.
    Mixed,
}

impl Primitive {
    /// Resolve a base type name, if it is a primitive.
    pub fn from_name(name: &str) -> Option<Primitive> {
        match name {
            "null" => Some(Primitive::Null),
            "int" => Some(Primitive::Int),
            "float" => Some(Primitive::Float),
            "bool" => Some(Primitive::Bool),
            "string" => Some(Primitive::String),
            "array" => Some(Primitive::Array),
            "mixed" => Some(Primitive::Mixed),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::String => "string",
            Primitive::Array => "array",
            Primitive::Mixed => "mixed",
        }
    }

    /// The host-native predicate for this primitive.
    pub fn check(self, visitor: &dyn Visitor) -> bool {
        match self {
            Primitive::Null => visitor.is_null(),
            Primitive::Int => visitor.is_integer(),
            Primitive::Float => visitor.is_float(),
            Primitive::Bool => visitor.is_bool(),
            Primitive::String => visitor.is_string(),
            Primitive::Array => visitor.is_array(),
            Primitive::Mixed => true,
        }
    }

    /// The JSON-Schema type names for this primitive, or `None` for
    /// `mixed` (which renders as the accept-anything schema `{}`).
    pub fn schema_types(self) -> Option<&'static [&'static str]> {
        match self {
            Primitive::Null => Some(&["null"]),
            Primitive::Int => Some(&["integer"]),
            Primitive::Float => Some(&["number"]),
            Primitive::Bool => Some(&["boolean"]),
            Primitive::String => Some(&["string"]),
            Primitive::Array => Some(&["object", "array"]),
            Primitive::Mixed => None,
        }
    }

    /// A standalone schema fragment for this primitive.
    pub fn schema(self) -> serde_json::Value {
        match self.schema_types() {
            None => json!({}),
            Some([single]) => json!({ "type": single }),
            Some(many) => json!({ "type": many }),
        }
    }
}
