//! Client-supplied connection arguments.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::Filter;
use crate::Cursor;

/// Client-facing sort direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SortDirection {
    /// Ascending order (A-Z, oldest first, smallest first).
    #[default]
    #[serde(alias = "asc")]
    Asc,
    /// Descending order (Z-A, newest first, largest first).
    #[serde(alias = "desc")]
    Desc,
}

/// Free-text search over a set of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Search {
    /// Prefix every listed field is matched against, ignoring case.
    pub search_term: String,
    /// Fields searched, in order.
    pub columns: Vec<String>,
}

impl Search {
    /// Creates a new search over the given fields.
    pub fn new<I, S>(search_term: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_term: search_term.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns whether this search would match nothing in particular.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() || self.columns.is_empty()
    }
}

/// Arguments of a single connection request.
///
/// Forward paging uses `first` with an optional `after` cursor, backward
/// paging uses `last` with an optional `before` cursor.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ConnectionArgs {
    /// Field the result set is ordered by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Direction of the client-facing order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    /// Number of rows to return when paging forward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<i64>,
    /// Number of rows to return when paging backward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<i64>,
    /// Cursor of the last row already seen when paging forward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Cursor>,
    /// Cursor of the first row already seen when paging backward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Cursor>,
    /// Optional free-text search merged into the filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<Search>,
    /// Predicate passed through to the row source.
    #[serde(default)]
    pub filter: Filter,
}

impl ConnectionArgs {
    /// Creates arguments ordered by `sort` in the given direction.
    pub fn new(sort: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            sort: Some(sort.into()),
            direction: Some(direction),
            ..Self::default()
        }
    }

    /// Requests the first `first` rows.
    pub fn first(mut self, first: i64) -> Self {
        self.first = Some(first);
        self
    }

    /// Requests the last `last` rows.
    pub fn last(mut self, last: i64) -> Self {
        self.last = Some(last);
        self
    }

    /// Starts the page after the given cursor.
    pub fn after(mut self, cursor: Cursor) -> Self {
        self.after = Some(cursor);
        self
    }

    /// Ends the page before the given cursor.
    pub fn before(mut self, cursor: Cursor) -> Self {
        self.before = Some(cursor);
        self
    }

    /// Adds a free-text search.
    pub fn with_search(mut self, search: Search) -> Self {
        self.search = Some(search);
        self
    }

    /// Replaces the filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Returns whether backward paging was requested.
    #[inline]
    pub fn is_backward(&self) -> bool {
        self.last.is_some()
    }

    /// Returns the cursor relevant to the requested paging direction.
    #[inline]
    pub fn cursor(&self) -> Option<&Cursor> {
        if self.is_backward() {
            self.before.as_ref()
        } else {
            self.after.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_direction_parses_case_insensitively() {
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.to_string(), "DESC");
    }

    #[test]
    fn deserializes_camel_case_arguments() {
        let args: ConnectionArgs = serde_json::from_value(serde_json::json!({
            "sort": "name",
            "direction": "DESC",
            "last": 5,
            "before": "NA==",
            "search": { "searchTerm": "al", "columns": ["name", "email"] },
            "filter": { "active": true }
        }))
        .unwrap();

        assert_eq!(args.sort.as_deref(), Some("name"));
        assert_eq!(args.direction, Some(SortDirection::Desc));
        assert!(args.is_backward());
        assert_eq!(args.cursor().map(Cursor::as_str), Some("NA=="));
        assert_eq!(args.search.unwrap().columns, vec!["name", "email"]);
        assert_eq!(args.filter.len(), 1);
    }

    #[test]
    fn cursor_follows_direction() {
        let args = ConnectionArgs::new("id", SortDirection::Asc)
            .first(3)
            .after(Cursor::encode(2));
        assert!(!args.is_backward());
        assert_eq!(args.cursor(), Some(&Cursor::encode(2)));
    }
}
