use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A key/value bag backed by a JSON object.
///
/// Both [`AccessToken`](crate::token::AccessToken) and [`User`](crate::user::User)
/// keep the provider's payload in an `Items` so that provider-specific fields
/// stay reachable after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Items {
    items: Map<String, Value>,
}

impl Items {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the underlying map.
    pub fn items(&self) -> &Map<String, Value> {
        &self.items
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.items.get(key)
    }

    /// Get the value stored under `key`, or `default` when it is absent.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get_or_else(key, || default)
    }

    /// Get the value stored under `key`, computing the default only on a miss.
    pub fn get_or_else<F>(&self, key: &str, default: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        match self.items.get(key) {
            Some(value) => value.clone(),
            None => default(),
        }
    }

    /// Get a scalar value as a string. Numbers and booleans are stringified,
    /// `null`, arrays and objects yield `None`.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.items.get(key).and_then(scalar_to_string)
    }

    /// Look up a value using "dot" notation.
    ///
    /// An exact key match wins; otherwise each `.`-separated segment descends
    /// one level into nested objects.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.items.get(path) {
            return Some(value);
        }

        let mut segments = path.split('.');
        let mut current = self.items.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Insert or overwrite `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.items.insert(key.into(), value.into());
        self
    }

    /// Whether `key` is present (even when its value is `null`).
    pub fn has(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Whether the bag holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.items.remove(key)
    }

    /// Shallow merge: keys in `other` overwrite existing ones.
    pub fn merge(&mut self, other: Map<String, Value>) -> &mut Self {
        for (key, value) in other {
            self.items.insert(key, value);
        }
        self
    }

    /// Export every entry.
    pub fn to_map(&self) -> Map<String, Value> {
        self.items.clone()
    }

    /// Export every entry as a JSON object string. Non-ASCII text is written as-is.
    pub fn to_json(&self) -> String {
        Value::Object(self.items.clone()).to_string()
    }
}

impl From<Map<String, Value>> for Items {
    fn from(items: Map<String, Value>) -> Self {
        Self { items }
    }
}

impl From<Items> for Map<String, Value> {
    fn from(items: Items) -> Self {
        items.items
    }
}

/// Render a scalar JSON value as a string.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
