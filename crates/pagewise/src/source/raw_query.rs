//! Raw SQL fragments paged by the paginator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Order, Row};
use crate::{Error, Result};

/// Column every row of a raw query carries with the total matching count.
///
/// The fragment's own `SELECT` produces it, usually as `count(*) OVER ()`.
pub const FULL_COUNT_COLUMN: &str = "full_count";

/// A parameterized SQL fragment with positional `?` replacements.
///
/// The fragment must not carry its own `ORDER BY`, `LIMIT` or `OFFSET`; the
/// paginator appends them through [`RawQuery::paged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuery {
    /// SQL text selecting the rows and their `full_count`.
    pub sql: String,
    /// Values bound to the `?` placeholders of `sql`, in order.
    #[serde(default)]
    pub replacements: Vec<Value>,
}

impl RawQuery {
    /// Creates a raw query without replacements.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            replacements: Vec::new(),
        }
    }

    /// Appends a positional replacement.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.replacements.push(value.into());
        self
    }

    /// Returns this query with an `ORDER BY ... LIMIT ? OFFSET ?` clause appended.
    ///
    /// `limit` and `offset` are appended to the replacements in that order.
    pub fn paged(&self, order: &[Order], limit: u64, offset: u64) -> Self {
        let mut sql = self.sql.trim_end().trim_end_matches(';').to_owned();

        if !order.is_empty() {
            let terms: Vec<String> = order.iter().map(Order::to_sql).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        sql.push_str(" LIMIT ? OFFSET ?");

        let mut replacements = self.replacements.clone();
        replacements.push(Value::from(limit));
        replacements.push(Value::from(offset));

        Self { sql, replacements }
    }
}

/// Reads the total matching count off the first row of a raw query.
///
/// An empty result counts as `0`. Drivers report `bigint` windows either as
/// numbers or as decimal text, so both are accepted.
pub fn read_full_count(rows: &[Row]) -> Result<u64> {
    let Some(first) = rows.first() else {
        return Ok(0);
    };

    let missing = || {
        Error::internal(format!(
            "Raw query rows must carry a numeric `{FULL_COUNT_COLUMN}` column"
        ))
    };

    match first.get(FULL_COUNT_COLUMN) {
        Some(Value::Number(number)) => number.as_u64().ok_or_else(missing),
        Some(Value::String(text)) => text.trim().parse().map_err(|_| missing()),
        _ => Err(missing()),
    }
}
