use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A single column value inside a [`Record`].
///
/// The boundary only carries strings, integers, floats and null, so the
/// enum is deliberately this small.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Null,
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Total ordering used when sorting rows by a column. Values of
    /// different types sort by type rank (null < numbers < text) so a
    /// mixed column still produces a stable order.
    pub fn compare(&self, other: &Value, case_insensitive: bool) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Text(a), Text(b)) if case_insensitive => {
                a.to_lowercase().cmp(&b.to_lowercase())
            }
            (Text(a), Text(b)) => a.cmp(b),
            (Text(_), _) => Ordering::Greater,
            (_, Text(_)) => Ordering::Less,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

/// One result row: a mapping from column name to value.
///
/// Insertion order is irrelevant; rows compare by content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.0.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(column, value)| (column.as_str(), value))
    }

    /// Keep only the named columns. Used when a source has no native
    /// projection support.
    pub fn project(&mut self, columns: &[String]) {
        self.0.retain(|column, _| columns.iter().any(|keep| keep == column));
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_serializes_as_json_null() {
        let mut record = Record::new();
        record.insert("title", "A Song");
        record.insert("bookmark", Value::Null);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"bookmark":null,"title":"A Song"}"#);
    }

    #[test]
    fn compare_is_case_insensitive_when_asked() {
        let a = Value::from("Beta");
        let b = Value::from("alpha");
        // ASCII puts uppercase before lowercase.
        assert_eq!(a.compare(&b, false), Ordering::Less);
        assert_eq!(a.compare(&b, true), Ordering::Greater);
    }

    #[test]
    fn null_sorts_first() {
        assert_eq!(Value::Null.compare(&Value::from(1), false), Ordering::Less);
        assert_eq!(Value::from("x").compare(&Value::Null, false), Ordering::Greater);
    }

    #[test]
    fn project_drops_unlisted_columns() {
        let mut record = Record::new();
        record.insert("title", "t");
        record.insert("artist", "a");
        record.project(&["title".to_string()]);
        assert!(record.contains("title"));
        assert!(!record.contains("artist"));
    }
}
