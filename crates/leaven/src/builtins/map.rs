//! The builtin `map` handler.
//!
//! Accepts one generic argument (`map<V>`, keys unconstrained) or two
//! (`map<K, V>`). Input keys arrive stringified; a key that parses as an
//! integer is matched against the key type as an integer, everything else
//! as a string.

use serde_json::json;

use leaven_expr::TypeExpr;
use leaven_value::{Entries, Key, Value, ValueVisitor, VisitorRef};

use crate::engine::Engine;
use crate::errors::ExpandError;
use crate::handler::Handler;
use crate::path::Path;
use crate::schema::SchemaBuilder;

/// Expands container input of either shape into a keyed map, with every
/// value expanded into the value type and every key checked against the
/// key type.
pub struct MapHandler {
    params: Vec<String>,
}

impl MapHandler {
    pub fn new() -> Self {
        MapHandler { params: vec!["K".to_owned(), "V".to_owned()] }
    }
}

impl Default for MapHandler {
    fn default() -> Self {
        MapHandler::new()
    }
}

fn split_generics(generics: &[TypeExpr]) -> Option<(Option<&TypeExpr>, &TypeExpr)> {
    match generics {
        [value] => Some((None, value)),
        [key, value] => Some((Some(key), value)),
        _ => None,
    }
}

fn native_key(key: &str) -> Key {
    match key.parse::<i64>() {
        Ok(i) => Key::Int(i),
        Err(_) => Key::Str(key.to_owned()),
    }
}

fn key_matches(engine: &Engine, key_type: Option<&TypeExpr>, key: &str) -> bool {
    let Some(key_type) = key_type else { return true };
    let value = match native_key(key) {
        Key::Int(i) => Value::Int(i),
        Key::Str(s) => Value::String(s),
    };
    engine.validate_expr(key_type, &ValueVisitor::new(value), &Path::root())
}

impl Handler for MapHandler {
    fn name(&self) -> &str {
        "map"
    }

    fn generic_params(&self) -> &[String] {
        &self.params
    }

    fn accepts_arity(&self, count: usize) -> bool {
        count == 1 || count == 2
    }

    fn validate(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        _path: &Path,
    ) -> bool {
        let Some((key_type, value_type)) = split_generics(generics) else {
            return false;
        };
        visitor.is_array()
            && visitor.keys().iter().all(|key| {
                key_matches(engine, key_type, key)
                    && engine.validate_expr(value_type, &visitor.enter_object(key), &Path::root())
            })
    }

    fn expand(
        &self,
        engine: &Engine,
        visitor: &VisitorRef,
        generics: &[TypeExpr],
        _path: &Path,
    ) -> Result<Value, ExpandError> {
        let Some((key_type, value_type)) = split_generics(generics) else {
            return Err(ExpandError::no_match("map", "expected one or two generic arguments"));
        };
        if !visitor.is_array() {
            return Err(ExpandError::no_match(
                "map",
                format!("input of type {} is not a container", visitor.value().type_name()),
            ));
        }
        let mut entries = Entries::new();
        for key in visitor.keys() {
            if !key_matches(engine, key_type, &key) {
                return Err(ExpandError::no_match(
                    "map",
                    format!("key `{key}` does not match the key type"),
                ));
            }
            let value = engine.expand_expr(value_type, &visitor.enter_object(&key), &Path::root())?;
            entries.insert(native_key(&key), value);
        }
        Ok(Value::Array(entries))
    }

    fn build_schema(
        &self,
        builder: &mut SchemaBuilder<'_>,
        generics: &[TypeExpr],
        _definition_name: &str,
    ) -> Result<serde_json::Value, ExpandError> {
        let Some((_, value_type)) = split_generics(generics) else {
            return Err(ExpandError::format("map", "expected one or two generic arguments"));
        };
        let values = builder.reference(value_type)?;
        Ok(json!({ "type": "object", "additionalProperties": values }))
    }
}
