//! Mapping from client-facing field names to store columns.

use std::collections::BTreeMap;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Row;

/// Maps client-facing field names to store column names.
///
/// Used to translate the requested sort field into a column and to rename
/// result rows; columns without a mapped field are dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct FieldMap {
    fields: BTreeMap<String, String>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `field` to `column`, replacing any previous mapping of `field`.
    pub fn with(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.fields.insert(field.into(), column.into());
        self
    }

    /// Returns the store column for a client field.
    #[inline]
    pub fn column(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Returns whether the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of mapped fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over `(field, column)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, c)| (f.as_str(), c.as_str()))
    }

    /// Returns whether every field and column name is non-blank.
    pub fn is_well_formed(&self) -> bool {
        !self.is_empty()
            && self
                .iter()
                .all(|(field, column)| !field.trim().is_empty() && !column.trim().is_empty())
    }

    /// Renames the columns of `row` to client fields.
    ///
    /// Columns with no mapped field are dropped; fields whose column is
    /// absent from the row are omitted.
    pub fn apply(&self, row: &Row) -> Row {
        self.iter()
            .filter_map(|(field, column)| {
                row.get(column)
                    .map(|value| (field.to_owned(), value.clone()))
            })
            .collect()
    }
}

impl<F, C> FromIterator<(F, C)> for FieldMap
where
    F: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, C)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(f, c)| (f.into(), c.into()))
                .collect(),
        }
    }
}
