//! Visitor backing for opaque JSON documents.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::value::Value;
use crate::visitor::{ChildKey, Visitor, VisitorRef};

/// Cursor over a `serde_json::Value` document, accessed by member lookup
/// without converting the whole tree up front.
///
/// JSON distinguishes arrays from objects natively, so classification is
/// direct: arrays are lists, objects are objects. The empty container
/// still answers true to both predicates, matching the native backing.
pub struct JsonVisitor {
    value: serde_json::Value,
    children: Mutex<FxHashMap<ChildKey, VisitorRef>>,
}

impl JsonVisitor {
    /// Wrap a JSON document into a shareable cursor.
    pub fn new(value: serde_json::Value) -> VisitorRef {
        Arc::new(JsonVisitor { value, children: Mutex::new(FxHashMap::default()) })
    }

    fn child(&self, key: ChildKey, value: Option<&serde_json::Value>) -> VisitorRef {
        let mut children = self.children.lock();
        children
            .entry(key)
            .or_insert_with(|| {
                JsonVisitor::new(value.cloned().unwrap_or(serde_json::Value::Null))
            })
            .clone()
    }

    fn lookup(&self, key: &str) -> Option<&serde_json::Value> {
        match &self.value {
            serde_json::Value::Object(map) => map.get(key),
            serde_json::Value::Array(items) => {
                key.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            _ => None,
        }
    }
}

impl Visitor for JsonVisitor {
    fn is_null(&self) -> bool {
        self.value.is_null()
    }

    fn is_integer(&self) -> bool {
        self.value.is_i64() || self.value.is_u64()
    }

    fn is_float(&self) -> bool {
        self.value.is_f64()
    }

    fn is_bool(&self) -> bool {
        self.value.is_boolean()
    }

    fn is_string(&self) -> bool {
        self.value.is_string()
    }

    fn is_array(&self) -> bool {
        self.value.is_array() || self.value.is_object()
    }

    fn is_object(&self) -> bool {
        match &self.value {
            serde_json::Value::Object(_) => true,
            serde_json::Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    fn is_list(&self) -> bool {
        match &self.value {
            serde_json::Value::Array(_) => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    fn length(&self) -> usize {
        match &self.value {
            serde_json::Value::Array(items) => items.len(),
            serde_json::Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    fn keys(&self) -> Vec<String> {
        match &self.value {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            serde_json::Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    fn enter_object(&self, key: &str) -> VisitorRef {
        let value = self.lookup(key);
        self.child(ChildKey::Object(key.to_owned()), value)
    }

    fn enter_array(&self, index: usize) -> VisitorRef {
        let value = match &self.value {
            serde_json::Value::Array(items) => items.get(index),
            _ => None,
        };
        self.child(ChildKey::Index(index), value)
    }

    fn value(&self) -> Value {
        Value::from_json(&self.value)
    }
}
