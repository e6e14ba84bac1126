//! Visitor backing for native [`Value`] trees.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::value::Value;
use crate::visitor::{ChildKey, Visitor, VisitorRef};

/// Cursor over a native [`Value`] tree.
///
/// Containers follow the ordered-map classification rule: a container
/// whose keys are sequential integers from zero (or which is empty) is a
/// list; anything else, including records, is an object.
pub struct ValueVisitor {
    value: Value,
    children: Mutex<FxHashMap<ChildKey, VisitorRef>>,
}

impl ValueVisitor {
    /// Wrap a value into a shareable cursor.
    pub fn new(value: Value) -> VisitorRef {
        Arc::new(ValueVisitor { value, children: Mutex::new(FxHashMap::default()) })
    }

    fn child(&self, key: ChildKey, value: Option<&Value>) -> VisitorRef {
        let mut children = self.children.lock();
        children
            .entry(key)
            .or_insert_with(|| ValueVisitor::new(value.cloned().unwrap_or(Value::Null)))
            .clone()
    }
}

impl Visitor for ValueVisitor {
    fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }

    fn is_integer(&self) -> bool {
        matches!(self.value, Value::Int(_))
    }

    fn is_float(&self) -> bool {
        matches!(self.value, Value::Float(_))
    }

    fn is_bool(&self) -> bool {
        matches!(self.value, Value::Bool(_))
    }

    fn is_string(&self) -> bool {
        matches!(self.value, Value::String(_))
    }

    fn is_array(&self) -> bool {
        matches!(self.value, Value::Array(_))
    }

    fn is_object(&self) -> bool {
        match &self.value {
            Value::Array(entries) => !entries.is_list() || entries.is_empty(),
            Value::Record(_) => true,
            _ => false,
        }
    }

    fn is_list(&self) -> bool {
        match &self.value {
            Value::Array(entries) => entries.is_list(),
            _ => false,
        }
    }

    fn length(&self) -> usize {
        match &self.value {
            Value::Array(entries) => entries.len(),
            Value::Record(record) => record.fields().count(),
            _ => 0,
        }
    }

    fn keys(&self) -> Vec<String> {
        match &self.value {
            Value::Array(entries) => entries.keys().map(ToString::to_string).collect(),
            Value::Record(record) => record.fields().map(|(name, _)| name.to_owned()).collect(),
            _ => Vec::new(),
        }
    }

    fn has_key(&self, key: &str) -> bool {
        match &self.value {
            Value::Array(entries) => entries.get_str(key).is_some(),
            Value::Record(record) => record.get(key).is_some(),
            _ => false,
        }
    }

    fn enter_object(&self, key: &str) -> VisitorRef {
        let value = match &self.value {
            Value::Array(entries) => entries.get_str(key),
            Value::Record(record) => record.get(key),
            _ => None,
        };
        self.child(ChildKey::Object(key.to_owned()), value)
    }

    fn enter_array(&self, index: usize) -> VisitorRef {
        let value = match &self.value {
            Value::Array(entries) => entries.get_index(index),
            _ => None,
        };
        self.child(ChildKey::Index(index), value)
    }

    fn value(&self) -> Value {
        self.value.clone()
    }
}
