//! The generic document representation that schemas validate.
//!
//! Documents usually come from JSON text. [`Value`](enum.Value.html) mirrors
//! JSON's shapes, keeps map keys in document order, and keeps the integral or
//! floating representation of numbers so that `Integer` and `Float` can be
//! told apart without coercion.

use crate::path::{Path, Segment};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Number;
use std::ops::Index;
use std::str::FromStr;

/// An ordered map of canonical string keys to values.
pub type Map = IndexMap<String, Value>;

static NULL: Value = Value::Null;

/// A decoded document, or any part of one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Map(Map),
    List(Vec<Value>),
}

impl Value {
    /// The class name of this value, as it appears in validation messages.
    pub fn class_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Number(n) if n.is_f64() => "Float",
            Value::Number(_) => "Integer",
            Value::Text(_) => "Text",
            Value::Map(_) => "Map",
            Value::List(_) => "List",
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            _ => false,
        }
    }

    /// Is this value null, or text with nothing but whitespace?
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Looks up a key of a map. Returns `None` for non-maps and absent keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Follows a sequence of keys through nested maps.
    ///
    /// A key that parses as an integer also indexes into lists, so
    /// `["a", "2"]` reaches the third element of the list under `a`.
    pub fn at_keys<S: AsRef<str>>(&self, keys: &[S]) -> Option<&Value> {
        keys.iter().try_fold(self, |value, key| {
            let key = key.as_ref();
            match value {
                Value::Map(m) => m.get(key),
                Value::List(l) => key.parse::<usize>().ok().and_then(|i| l.get(i)),
                _ => None,
            }
        })
    }

    /// Follows a [`Path`](../path/struct.Path.html) through the document.
    pub fn at_path(&self, path: &Path) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(self, |value, segment| match (segment, value) {
                (Segment::Key(k), Value::Map(m)) => m.get(k.as_str()),
                (Segment::Index(i), Value::List(l)) => l.get(*i),
                _ => None,
            })
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// Decodes JSON text. Malformed text never produces a partial value.
impl FromStr for Value {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str::<serde_json::Value>(s).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(a) => Value::List(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => {
                Value::Map(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Value::Number(n),
            Value::Text(s) => serde_json::Value::String(s),
            Value::List(l) => serde_json::Value::Array(l.into_iter().map(Into::into).collect()),
            Value::Map(m) => {
                serde_json::Value::Object(m.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

/// Missing keys index to `Value::Null`, the same as an explicit null.
impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.as_list().and_then(|l| l.get(index)).unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_names() {
        assert_eq!(Value::from(json!(null)).class_name(), "Null");
        assert_eq!(Value::from(json!(false)).class_name(), "Boolean");
        assert_eq!(Value::from(json!(5)).class_name(), "Integer");
        assert_eq!(Value::from(json!(5.5)).class_name(), "Float");
        assert_eq!(Value::from(json!("5")).class_name(), "Text");
        assert_eq!(Value::from(json!({})).class_name(), "Map");
        assert_eq!(Value::from(json!([])).class_name(), "List");
    }

    #[test]
    fn keeps_key_order() {
        let value: Value = r#"{"b": 1, "a": 2, "c": 3}"#.parse().unwrap();
        let keys: Vec<&str> = value.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn blankness() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("  \t").is_blank());
        assert!(!Value::from(" x ").is_blank());
        assert!(!Value::from(false).is_blank());
        assert!(!Value::from(json!([])).is_blank());
    }

    #[test]
    fn lookups() {
        let value = Value::from(json!({ "a": { "b": [10, { "c": "deep" }] } }));
        assert_eq!(value["a"]["b"][0], Value::from(10));
        assert_eq!(value["missing"], Value::Null);
        assert_eq!(
            value.at_keys(&["a", "b", "1", "c"]),
            Some(&Value::from("deep"))
        );
        assert_eq!(value.at_keys(&["a", "x"]), None);
    }

    #[test]
    fn malformed_text() {
        assert!("{\"a\": ".parse::<Value>().is_err());
    }

    #[test]
    fn converts_back_to_json() {
        let json = json!({ "a": [1, 2.5, "x", null, true] });
        assert_eq!(serde_json::Value::from(Value::from(json.clone())), json);
    }
}
