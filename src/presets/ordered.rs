// SPDX-License-Identifier: GPL-3.0-only

//! Insertion-ordered string-keyed collection.
//!
//! Category and preset order drives what the user sees, so collections are kept
//! as an explicit list of `(key, value)` pairs instead of relying on a map's
//! iteration order. Keys are unique. The type serializes as a JSON object in
//! list order and deserializes in document order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Ordered list of uniquely keyed entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the index of `key`, if present.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the value for `key`, appending `make()` first if it is missing.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let index = match self.position(key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), make()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Inserts or overwrites `key`.
    ///
    /// An existing key keeps its position; a new key is appended. Returns the
    /// previous value when one was replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Inserts a new key at `index` (clamped to the end).
    ///
    /// Returns `false` without changes if the key already exists.
    pub fn insert_at(&mut self, index: usize, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, (key, value));
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.position(key).map(|index| self.entries.remove(index).1)
    }

    /// Replaces the entry stored under `old_key` with `(new_key, value)` at the
    /// same position.
    ///
    /// Fails when `old_key` is missing or `new_key` names a different entry.
    pub fn replace_entry(&mut self, old_key: &str, new_key: impl Into<String>, value: V) -> bool {
        let new_key = new_key.into();
        let Some(index) = self.position(old_key) else {
            return false;
        };
        if new_key != old_key && self.contains_key(&new_key) {
            return false;
        }
        self.entries[index] = (new_key, value);
        true
    }

    /// Renames `old_key` to `new_key` in place, keeping its value.
    pub fn rename_key(&mut self, old_key: &str, new_key: impl Into<String>) -> bool {
        let new_key = new_key.into();
        let Some(index) = self.position(old_key) else {
            return false;
        };
        if new_key != old_key && self.contains_key(&new_key) {
            return false;
        }
        self.entries[index].0 = new_key;
        true
    }

    /// Moves `key` to `new_index` (clamped to the end) by removing it and
    /// inserting it again. Other entries keep their relative order.
    pub fn move_to(&mut self, key: &str, new_index: usize) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };
        let entry = self.entries.remove(index);
        let new_index = new_index.min(self.entries.len());
        self.entries.insert(new_index, entry);
        true
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &V) -> bool) {
        self.entries.retain(|(k, v)| keep(k, v));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    /// Later duplicates overwrite earlier values in place.
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

// ============================================================================
// Tests
// ============================================================================
