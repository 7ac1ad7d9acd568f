//! Ordered record type used as the "map" data model.
//!
//! [`RecordMap`] wraps an [`IndexMap`] so that iteration follows insertion
//! order, which for records read from text is the column order.
//!
//! ```rust
//! use serde_dsv::{CsvValue, RecordMap};
//!
//! let mut record = RecordMap::new();
//! record.insert("id".to_string(), CsvValue::from(1));
//! record.insert("name".to_string(), CsvValue::from("Alice"));
//!
//! let keys: Vec<_> = record.keys().cloned().collect();
//! assert_eq!(keys, vec!["id", "name"]);
//! ```

use crate::CsvValue;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of model keys to cell values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordMap(IndexMap<String, CsvValue>);

impl RecordMap {
    #[must_use]
    pub fn new() -> Self {
        RecordMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RecordMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a value, returning the previous value for the key.
    pub fn insert(&mut self, key: String, value: CsvValue) -> Option<CsvValue> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CsvValue> {
        self.0.get(key)
    }

    /// Value at a position in insertion order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&String, &CsvValue)> {
        self.0.get_index(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, CsvValue> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, CsvValue> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, CsvValue> {
        self.0.iter()
    }
}

impl From<HashMap<String, CsvValue>> for RecordMap {
    fn from(map: HashMap<String, CsvValue>) -> Self {
        RecordMap(map.into_iter().collect())
    }
}

impl From<RecordMap> for HashMap<String, CsvValue> {
    fn from(map: RecordMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for RecordMap {
    type Item = (String, CsvValue);
    type IntoIter = indexmap::map::IntoIter<String, CsvValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, CsvValue)> for RecordMap {
    fn from_iter<T: IntoIterator<Item = (String, CsvValue)>>(iter: T) -> Self {
        RecordMap(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = RecordMap::new();
        record.insert("a".to_string(), CsvValue::from(1));
        record.insert("b".to_string(), CsvValue::from(2));
        assert_eq!(
            record.insert("a".to_string(), CsvValue::from(3)),
            Some(CsvValue::from(1))
        );
        assert_eq!(record.get_index(0).map(|(k, _)| k.as_str()), Some("a"));
        assert_eq!(record.get("a"), Some(&CsvValue::from(3)));
    }

    #[test]
    fn test_hashmap_conversion() {
        let record: RecordMap = vec![("k".to_string(), CsvValue::from("v"))]
            .into_iter()
            .collect();
        let map: HashMap<String, CsvValue> = record.into();
        assert_eq!(map.get("k"), Some(&CsvValue::from("v")));
    }
}
