// Ordered, duplicate-rejecting metadata mapping

use crate::error::{AvProbeError, AvResult};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered key/value metadata.
///
/// Keys are unique. Insertion order is the order the driver reported the
/// entries in and is preserved through serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    entries: Vec<(String, String)>,
}

impl Tags {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from pairs, failing on the first repeated key
    pub fn from_pairs<I, K, V>(pairs: I) -> AvResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut tags = Self::new();
        for (key, value) in pairs {
            tags.try_insert(key, value)?;
        }
        Ok(tags)
    }

    /// Append an entry; an existing key is a `DuplicateKey` error
    pub fn try_insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> AvResult<()> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(AvProbeError::DuplicateKey { key });
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    /// Append an entry or replace the value of an existing key in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Exact key lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive key lookup; the first match in insertion order wins
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        let wanted = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key) || k.to_lowercase() == wanted)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for Tags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct TagsVisitor;

impl<'de> Visitor<'de> for TagsVisitor {
    type Value = Tags;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of string tags with unique keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Tags, A::Error> {
        let mut tags = Tags::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            tags.try_insert(key, value).map_err(serde::de::Error::custom)?;
        }
        Ok(tags)
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TagsVisitor)
    }
}
