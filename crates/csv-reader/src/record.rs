//! Records: column names paired with one row's values.

use crate::error::ReaderError;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One decoded row keyed by the column schema.
///
/// Fields keep schema order. When the schema repeats a column name, the name
/// keeps its first position and takes the last value paired with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Get the value for a column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Number of distinct columns in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    /// Consume the record, returning its `(column, value)` pairs.
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.fields
    }

    fn insert(&mut self, column: String, value: String) {
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Pair column names with row values by position.
///
/// Both inputs are taken in iteration order, so column `i` maps to value `i`
/// whatever labels or indices either side carried before. Fails with
/// [`ReaderError::ArityMismatch`] when the counts differ.
pub fn compose_item<C, V>(columns: C, values: V) -> Result<Record, ReaderError>
where
    C: IntoIterator,
    C::Item: AsRef<str>,
    V: IntoIterator,
    V::Item: AsRef<str>,
{
    let columns: Vec<C::Item> = columns.into_iter().collect();
    let values: Vec<V::Item> = values.into_iter().collect();

    if columns.len() != values.len() {
        return Err(ReaderError::ArityMismatch {
            expected: columns.len(),
            actual: values.len(),
        });
    }

    let mut record = Record {
        fields: Vec::with_capacity(columns.len()),
    };
    for (column, value) in columns.iter().zip(values.iter()) {
        record.insert(column.as_ref().to_string(), value.as_ref().to_string());
    }
    Ok(record)
}
