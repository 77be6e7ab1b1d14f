//! Domain records
//!
//! A record is an ordered list of single-entry maps, `[{"a.b": "Hello"}, ...]`,
//! deduplicated by key. That is also its persisted JSON shape.

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::harvest::Annotation;

/// One `{ key: value }` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<Annotation> for Entry {
    fn from(annotation: Annotation) -> Self {
        Self {
            key: annotation.key,
            value: annotation.value,
        }
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = Entry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-entry map of key to value")
            }

            // Only the first key counts; anything after it is ignored.
            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Entry, A::Error> {
                let (key, value) = map
                    .next_entry::<String, String>()?
                    .ok_or_else(|| <A::Error as de::Error>::invalid_length(0, &self))?;
                while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
                Ok(Entry { key, value })
            }
        }

        deserializer.deserialize_map(EntryVisitor)
    }
}

/// Ordered, key-deduplicated list of entries for one domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainRecord {
    entries: Vec<Entry>,
}

impl DomainRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// Appends every entry whose key is not present yet and returns how many
    /// were appended. Existing entries are never updated or removed, and the
    /// first occurrence of a key within `incoming` wins.
    pub fn merge<I, E>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry>,
    {
        let mut seen: HashSet<String> = self.entries.iter().map(|e| e.key.clone()).collect();
        let before = self.entries.len();

        for entry in incoming.into_iter().map(Into::into) {
            if seen.insert(entry.key.clone()) {
                self.entries.push(entry);
            }
        }

        self.entries.len() - before
    }

    /// Single-level dictionary; the last entry wins should a key ever repeat
    pub fn flatten(&self) -> Map<String, Value> {
        let mut dictionary = Map::new();
        for entry in self.entries.iter() {
            dictionary.insert(entry.key.clone(), Value::String(entry.value.clone()));
        }
        dictionary
    }

    /// Pretty-printed dictionary, as copied to the clipboard
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Value::Object(self.flatten()))
    }
}

impl FromIterator<Entry> for DomainRecord {
    fn from_iter<T: IntoIterator<Item = Entry>>(iter: T) -> Self {
        let mut record = DomainRecord::new();
        record.merge(iter);
        record
    }
}
