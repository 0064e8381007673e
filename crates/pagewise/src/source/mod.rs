//! Row source contracts.
//!
//! A row source executes plain `LIMIT`/`OFFSET`/`ORDER BY` queries on behalf of
//! the paginator. Two shapes are supported: [`RowSource`] receives a structured
//! request and reports the total matching count itself, [`RawRowSource`] runs a
//! caller-supplied SQL fragment whose rows carry a [`FULL_COUNT_COLUMN`].

mod memory;
mod raw_query;

use std::future::Future;

pub use memory::MemoryRowSource;
pub use raw_query::{FULL_COUNT_COLUMN, RawQuery, read_full_count};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::types::{Filter, Order, Row};

/// A structured page query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Maximum number of rows to return; one more than the page size.
    pub limit: u64,
    /// Number of matching rows to skip.
    pub offset: u64,
    /// Ordering terms, applied in sequence.
    pub order: Vec<Order>,
    /// Predicate rows must match.
    pub filter: Filter,
}

/// Rows of a structured page query.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Rows in query order.
    pub rows: Vec<Row>,
    /// Number of rows matching the filter, ignoring limit and offset.
    pub count: u64,
}

impl QueryResult {
    /// Creates a new query result.
    #[inline]
    pub fn new(rows: Vec<Row>, count: u64) -> Self {
        Self { rows, count }
    }
}

/// Row store queried with structured requests.
///
/// Failures should be reported as internal errors; the paginator never
/// retries a failed round trip.
pub trait RowSource {
    /// Returns the requested page of rows and the total matching count.
    fn query(&self, request: QueryRequest) -> impl Future<Output = Result<QueryResult>> + Send;

    /// Returns the number of rows matching `filter`.
    fn count(&self, filter: &Filter) -> impl Future<Output = Result<u64>> + Send;
}

/// Row store queried with raw, parameterized SQL.
pub trait RawRowSource {
    /// Executes `sql` with positional `replacements` and returns every row.
    fn query_raw(
        &self,
        sql: &str,
        replacements: &[Value],
    ) -> impl Future<Output = Result<Vec<Row>>> + Send;
}
