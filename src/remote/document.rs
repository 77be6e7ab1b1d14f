//! Translation documents: nested maps addressed by dotted paths

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One language's nested key/value document, as the API returns it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationDocument(Map<String, Value>);

impl TranslationDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an API value; anything but an object becomes an empty document
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walks `key` segment by segment. A missing segment, a non-object on the
    /// way, or a leaf that is not a non-empty string all mean "no value".
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let (parents, last) = split_path(key);

        let mut current = &self.0;
        for segment in parents {
            current = current.get(segment)?.as_object()?;
        }

        current
            .get(last)?
            .as_str()
            .filter(|value| !value.is_empty())
    }

    /// Sets the leaf at `key`, creating intermediate maps as needed. A
    /// non-object sitting where a map is needed is replaced by one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let (parents, last) = split_path(key);

        let mut current = &mut self.0;
        for segment in parents {
            let slot = current
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(map) = slot else {
                return;
            };
            current = map;
        }

        current.insert(last.to_string(), Value::String(value.into()));
    }
}

fn split_path(key: &str) -> (Vec<&str>, &str) {
    match key.rsplit_once('.') {
        Some((parents, last)) => (parents.split('.').collect(), last),
        None => (Vec::new(), key),
    }
}
