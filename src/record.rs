//! A single row from a query result.
//!
//! A [`Record`] is an ordered mapping from column name to value. All
//! records of one result set share a single key list, so named lookup,
//! positional lookup, and iteration always agree on column order.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::RowsetResult;
use crate::export::{Dataset, Format};

/// A row, from a query, from a database.
///
/// Column names are arbitrary strings supplied by the query — they are
/// not restricted to identifier syntax, and duplicates are possible
/// (e.g. `SELECT 1 AS a, 2 AS a`). Named lookup returns the first match;
/// positional access reaches every column.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    keys: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    /// Create a record from a shared key list and its values.
    ///
    /// The key list is shared across every record of one result set.
    pub fn new(keys: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self { keys, values }
    }

    /// The column names from the query, in result order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The values from the query, in result order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by column name. Returns the first matching column.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| &self.values[i])
    }

    /// Look up a value by column position.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Iterate over `(column name, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// The record as an ordered JSON object.
    pub fn as_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in self.iter() {
            map.insert(key.to_string(), value.clone());
        }
        map
    }

    /// A single-row [`Dataset`] containing this record.
    pub fn dataset(&self) -> Dataset {
        let mut data = Dataset::new(self.keys.to_vec());
        data.push(self.values.clone());
        data
    }

    /// Export the record to the given format.
    pub fn export(&self, format: Format) -> RowsetResult<String> {
        self.dataset().export(format)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.as_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record() -> Record {
        let keys: Arc<[String]> = vec![
            "id".to_string(),
            "name".to_string(),
            "count(*)".to_string(),
        ]
        .into();
        Record::new(keys, vec![json!(1), json!("a"), json!(42)])
    }

    #[test]
    fn test_get_by_name() {
        let row = record();
        assert_eq!(row.get("id"), Some(&json!(1)));
        assert_eq!(row.get("name"), Some(&json!("a")));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_get_non_identifier_key() {
        // Column names are not restricted to identifier syntax.
        let row = record();
        assert_eq!(row.get("count(*)"), Some(&json!(42)));
    }

    #[test]
    fn test_at_by_position() {
        let row = record();
        assert_eq!(row.at(0), Some(&json!(1)));
        assert_eq!(row.at(2), Some(&json!(42)));
        assert_eq!(row.at(3), None);
    }

    #[test]
    fn test_duplicate_key_returns_first() {
        let keys: Arc<[String]> = vec!["a".to_string(), "a".to_string()].into();
        let row = Record::new(keys, vec![json!(1), json!(2)]);
        assert_eq!(row.get("a"), Some(&json!(1)));
        assert_eq!(row.at(1), Some(&json!(2)));
    }

    #[test]
    fn test_iter_preserves_order() {
        let row = record();
        let keys: Vec<&str> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "name", "count(*)"]);
    }

    #[test]
    fn test_as_json_preserves_order() {
        let row = record();
        let map = row.as_json();
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["id", "name", "count(*)"]);
    }

    #[test]
    fn test_display() {
        let keys: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        let row = Record::new(keys, vec![json!(1), json!("a")]);
        assert_eq!(row.to_string(), r#"{"id":1,"name":"a"}"#);
    }

    #[test]
    fn test_dataset_single_row() {
        let row = record();
        let data = row.dataset();
        assert_eq!(data.headers(), row.keys());
        assert_eq!(data.rows().len(), 1);
    }
}
