//! Connection envelope returned to clients.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Row;
use crate::Cursor;

/// A single row of a connection together with its cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Edge<T = Row> {
    /// Position of the node in the full ordered result set.
    pub cursor: Cursor,
    /// The row itself.
    pub node: T,
}

impl<T> Edge<T> {
    /// Creates a new edge.
    #[inline]
    pub fn new(cursor: Cursor, node: T) -> Self {
        Self { cursor, node }
    }
}

/// Page metadata of a connection.
///
/// A single peek row can only prove that more rows exist in the direction just
/// queried, so forward pages never report `has_previous_page` and backward
/// pages never report `has_next_page`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Cursor of the first edge, if any.
    pub start_cursor: Option<Cursor>,
    /// Cursor of the last edge, if any.
    pub end_cursor: Option<Cursor>,
    /// Whether more rows follow this page when paging forward.
    pub has_next_page: bool,
    /// Whether more rows precede this page when paging backward.
    pub has_previous_page: bool,
}

/// A paginated result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Connection<T = Row> {
    /// Rows of this page in client-facing order.
    pub edges: Vec<Edge<T>>,
    /// Page metadata.
    pub page_info: PageInfo,
    /// Number of edges on this page.
    ///
    /// This is the size of the returned page, not of the full result set;
    /// clients depend on it, so the full count lives in `full_count`.
    pub total_count: usize,
    /// Number of rows matching the filter across all pages.
    pub full_count: u64,
}

impl<T> Connection<T> {
    /// Creates an empty connection.
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo::default(),
            total_count: 0,
            full_count: 0,
        }
    }

    /// Returns the nodes of this page, dropping their cursors.
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|edge| edge.node).collect()
    }

    /// Maps the nodes to a different type, keeping cursors and page metadata.
    pub fn map<U, F>(self, mut f: F) -> Connection<U>
    where
        F: FnMut(T) -> U,
    {
        Connection {
            edges: self
                .edges
                .into_iter()
                .map(|edge| Edge::new(edge.cursor, f(edge.node)))
                .collect(),
            page_info: self.page_info,
            total_count: self.total_count,
            full_count: self.full_count,
        }
    }
}
