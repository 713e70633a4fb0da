//! Anatomy data: the token dictionary path templates are rendered against.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of looking up a token.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// A scalar (string, number or bool) value.
    Found(&'a Value),
    /// Absent, or explicitly null.
    Missing,
    /// An object or list where a scalar was needed.
    InvalidType,
}

/// Nested string-keyed token data.
///
/// Values are JSON values; a token such as `{task[short]}` reads key `short`
/// inside the `task` object.
///
/// ```
/// use shotforged_template::AnatomyData;
/// use serde_json::json;
///
/// let mut data = AnatomyData::from_value(json!({
///     "project": {"name": "Unicorn", "code": "uni"},
///     "version": 3,
/// }))
/// .unwrap();
/// data.set_nested("task", "short", "cmp");
///
/// assert_eq!(data.get_str(&["project", "code"]).as_deref(), Some("uni"));
/// assert_eq!(data.get_str(&["version"]).as_deref(), Some("3"));
/// assert_eq!(data.get_str(&["task", "short"]).as_deref(), Some("cmp"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnatomyData(Map<String, Value>);

impl AnatomyData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON object; anything else is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Set `outer[inner]`, creating or replacing `outer` as an object.
    ///
    /// Other keys already inside `outer` are kept.
    pub fn set_nested(&mut self, outer: &str, inner: &str, value: impl Into<Value>) {
        let entry = self
            .0
            .entry(outer.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(inner.to_string(), value.into());
        }
    }

    /// Copy every top-level key of `other` over this data.
    pub fn update(&mut self, other: &AnatomyData) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Look up a key path such as `["task", "short"]`.
    pub fn lookup(&self, path: &[&str]) -> Lookup<'_> {
        let Some((first, rest)) = path.split_first() else {
            return Lookup::Missing;
        };
        let mut current = match self.0.get(*first) {
            Some(value) => value,
            None => return Lookup::Missing,
        };
        for key in rest {
            current = match current {
                Value::Object(map) => match map.get(*key) {
                    Some(value) => value,
                    None => return Lookup::Missing,
                },
                Value::Null => return Lookup::Missing,
                _ => return Lookup::InvalidType,
            };
        }
        match current {
            Value::Null => Lookup::Missing,
            Value::Object(_) | Value::Array(_) => Lookup::InvalidType,
            value => Lookup::Found(value),
        }
    }

    /// Scalar at `path` rendered as a string.
    pub fn get_str(&self, path: &[&str]) -> Option<String> {
        match self.lookup(path) {
            Lookup::Found(value) => Some(scalar_to_string(value)),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for AnatomyData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
