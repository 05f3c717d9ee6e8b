//! Student record entity

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One roster row: an ordered mapping from field name to an optional text value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentRecord {
    values: Vec<(String, Option<String>)>,
}

impl StudentRecord {
    /// Create an empty record
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Builder-style setter for a present value
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// Builder-style setter for an absent value
    #[must_use]
    pub fn with_absent(mut self, field: impl Into<String>) -> Self {
        self.set(field, None);
        self
    }

    /// Set a field, replacing any previous value for the same name
    pub fn set(&mut self, field: impl Into<String>, value: Option<String>) {
        let field = field.into();
        match self.values.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((field, value)),
        }
    }

    /// Value of a field; `None` when the field is absent or missing from the record
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Whether the record carries the field at all (present or absent)
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.values.iter().any(|(name, _)| name == field)
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// Field/value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StudentRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (field, value) in iter {
            record.set(field, Some(value.into()));
        }
        record
    }
}

impl Serialize for StudentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
