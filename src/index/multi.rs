//! One-to-many relationship index.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Index mapping a key to many values, e.g. interchanges by the journey
/// they reference.
///
/// Keys never map to an empty list: emptying a key removes it.
pub struct MultiIndex<V> {
    /// key -> values, in insertion order.
    entries: RwLock<HashMap<String, Vec<Arc<V>>>>,
}

impl<V> Default for MultiIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MultiIndex<V> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get all values for `key`. Empty if the key is unknown.
    pub fn get(&self, key: &str) -> Vec<Arc<V>> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Append `value` to the values of `key`.
    pub fn add(&self, key: impl Into<String>, value: impl Into<Arc<V>>) {
        self.entries
            .write()
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// Replace the values of `key`. An empty `values` removes the key.
    pub fn put<I>(&self, key: impl Into<String>, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<V>>,
    {
        let key = key.into();
        let values: Vec<Arc<V>> = values.into_iter().map(Into::into).collect();

        let mut entries = self.entries.write();
        if values.is_empty() {
            entries.remove(&key);
        } else {
            entries.insert(key, values);
        }
    }

    /// Append every `(key, value)` pair.
    pub fn put_all<I, K, T>(&self, pairs: I)
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Arc<V>>,
    {
        let mut entries = self.entries.write();
        for (key, value) in pairs {
            entries.entry(key.into()).or_default().push(value.into());
        }
    }

    /// Remove `key`, returning its values.
    pub fn remove(&self, key: &str) -> Vec<Arc<V>> {
        self.entries.write().remove(key).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// All keys with at least one value.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Total number of values across all keys.
    pub fn value_count(&self) -> usize {
        self.entries.read().values().map(Vec::len).sum()
    }
}
