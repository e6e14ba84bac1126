//! The dynamic value model.

use std::fmt;
use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

/// A key in an [`Entries`] container.
///
/// Containers carry their original key kind; a string key that happens to
/// look numeric is still a string key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

/// An insertion-ordered map with integer or string keys.
///
/// This is the uniform container both JSON-style arrays and objects land
/// in; classification into list or object happens per the sequential-keys
/// rule (see crate docs).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Entries {
    items: Vec<(Key, Value)>,
}

impl Entries {
    pub fn new() -> Self {
        Entries::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an entry, replacing any existing entry with the same key.
    pub fn insert(&mut self, key: Key, value: Value) {
        if let Some(slot) = self.items.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.items.push((key, value));
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up by external string key; a key that parses as an integer
    /// falls back to integer-key lookup, so list entries are reachable by
    /// their stringified index.
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.get(&Key::Str(key.to_owned())) {
            return Some(value);
        }
        key.parse::<i64>().ok().and_then(|i| self.get(&Key::Int(i)))
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        i64::try_from(index)
            .ok()
            .and_then(|i| self.get(&Key::Int(i)))
            .or_else(|| self.items.get(index).map(|(_, v)| v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.items.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.items.iter().map(|(k, _)| k)
    }

    /// True iff the keys are exactly `0..n` in order, including `n == 0`.
    pub fn is_list(&self) -> bool {
        self.items
            .iter()
            .enumerate()
            .all(|(i, (k, _))| matches!(k, Key::Int(n) if i64::try_from(i) == Ok(*n)))
    }
}

impl FromIterator<(Key, Value)> for Entries {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        let mut entries = Entries::new();
        for (key, value) in iter {
            entries.insert(key, value);
        }
        entries
    }
}

/// The constructed representation of a unit value.
///
/// The default constructor and setter strategies build records; conversion
/// functions may return any [`Value`] instead.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    unit: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(unit: impl Into<String>) -> Self {
        Record { unit: unit.into(), fields: Vec::new() }
    }

    /// The unit name this record was constructed for.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Set a field, replacing any existing value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// A dynamic value: the input to and the result of expansion.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Entries),
    Record(Arc<Record>),
    Timestamp(OffsetDateTime),
    Uuid(Uuid),
}

impl Value {
    /// A list: sequential integer keys from zero.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Key::Int(i64::try_from(i).unwrap_or(i64::MAX)), v))
                .collect(),
        )
    }

    /// An object: string keys in insertion order.
    pub fn object<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Array(pairs.into_iter().map(|(k, v)| (Key::Str(k.into()), v)).collect())
    }

    /// A record value for `unit` with the given fields.
    pub fn record<K: Into<String>>(
        unit: impl Into<String>,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Value {
        let mut record = Record::new(unit);
        for (name, value) in fields {
            record.set(name, value);
        }
        Value::Record(Arc::new(record))
    }

    /// A short name for the value's runtime type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(entries) if entries.is_list() => "list",
            Value::Array(_) => "object",
            Value::Record(_) => "record",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Entries> {
        match self {
            Value::Array(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Convert a JSON document into the native model.
    ///
    /// Objects keep string keys, arrays get sequential integer keys;
    /// numbers become `Int` when they are integral in JSON.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::list(items.iter().map(Value::from_json)),
            serde_json::Value::Object(map) => {
                Value::object(map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Array(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Record(record) => {
                write!(f, "{}(", record.unit())?;
                for (i, (name, value)) in record.fields().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str(")")
            }
            Value::Timestamp(ts) => write!(f, "{ts}"),
            Value::Uuid(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sequential_keys_are_a_list() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let entries = list.as_array().unwrap();
        assert!(entries.is_list());
    }

    #[test]
    fn empty_container_is_a_list() {
        assert!(Entries::new().is_list());
    }

    #[test]
    fn string_keys_are_not_a_list() {
        let obj = Value::object(vec![("a", Value::Int(1))]);
        assert!(!obj.as_array().unwrap().is_list());
    }

    #[test]
    fn gapped_integer_keys_are_not_a_list() {
        let mut entries = Entries::new();
        entries.insert(Key::Int(0), Value::Int(1));
        entries.insert(Key::Int(2), Value::Int(2));
        assert!(!entries.is_list());
    }

    #[test]
    fn get_str_reaches_integer_keys() {
        let list = Value::list(vec![Value::from("a")]);
        let entries = list.as_array().unwrap();
        assert_eq!(entries.get_str("0"), Some(&Value::from("a")));
        assert_eq!(entries.get_str("1"), None);
    }

    #[test]
    fn record_set_replaces() {
        let mut record = Record::new("Service");
        record.set("name", Value::from("a"));
        record.set("name", Value::from("b"));
        assert_eq!(record.get("name"), Some(&Value::from("b")));
        assert_eq!(record.fields().count(), 1);
    }

    #[test]
    fn from_json_classifies_numbers() {
        let json: serde_json::Value = serde_json::json!({"a": 1, "b": 1.5});
        let value = Value::from_json(&json);
        let entries = value.as_array().unwrap();
        assert_eq!(entries.get_str("a"), Some(&Value::Int(1)));
        assert_eq!(entries.get_str("b"), Some(&Value::Float(1.5)));
    }
}
