//! Connection assembly from a fetched page of rows.

use jiff::Timestamp;
use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use serde_json::Value;

use crate::types::{Connection, Edge, FieldMap, PageInfo, Row};
use crate::{Cursor, Error, PaginationConfig, Result, TRACING_TARGET_PAGINATE};

/// Parameters the page query was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContext {
    /// Number of rows requested by the client; the query asked for one more.
    pub page_size: u64,
    /// Offset the query was issued with.
    pub offset: u64,
    /// Number of rows matching the filter across all pages.
    pub count: u64,
    /// Whether the query ran in reverse of the client-facing order.
    pub flip: bool,
}

/// Builds a connection from the rows of a page query.
///
/// `rows` are in query order and may include the trailing peek row. Cursor
/// positions are computed against the full forward order, so forward and
/// backward pages over the same filter assign identical cursors to a row.
pub fn build_connection(
    mut rows: Vec<Row>,
    context: PageContext,
    field_map: Option<&FieldMap>,
    config: &PaginationConfig,
) -> Result<Connection> {
    let peek_len = usize::try_from(context.page_size + 1).unwrap_or(usize::MAX);
    if rows.len() > peek_len {
        tracing::warn!(
            target: TRACING_TARGET_PAGINATE,
            returned = rows.len(),
            requested = peek_len,
            "row source returned more rows than requested"
        );
        rows.truncate(peek_len);
    }

    let has_more = rows.len() == peek_len;
    if has_more {
        rows.pop();
    }

    if context.flip {
        rows.reverse();
    }

    let result_count = rows.len() as u64;
    let edges = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let position = cursor_position(context, result_count, index as u64)?;
            let node = match field_map {
                Some(field_map) => field_map.apply(&row),
                None => row,
            };

            Ok(Edge::new(
                Cursor::encode(position),
                normalize_timestamps(node, config),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let page_info = PageInfo {
        start_cursor: edges.first().map(|edge| edge.cursor.clone()),
        end_cursor: edges.last().map(|edge| edge.cursor.clone()),
        has_next_page: !context.flip && has_more,
        has_previous_page: context.flip && has_more,
    };

    tracing::debug!(
        target: TRACING_TARGET_PAGINATE,
        edges = edges.len(),
        has_next_page = page_info.has_next_page,
        has_previous_page = page_info.has_previous_page,
        "built connection"
    );

    Ok(Connection {
        total_count: edges.len(),
        edges,
        page_info,
        full_count: context.count,
    })
}

/// Returns the 1-based forward position of the row at `index`.
fn cursor_position(context: PageContext, result_count: u64, index: u64) -> Result<u64> {
    let position = if context.flip {
        i128::from(context.count) - i128::from(context.offset) - i128::from(result_count)
            + i128::from(index)
            + 1
    } else {
        i128::from(context.offset) + i128::from(index) + 1
    };

    u64::try_from(position)
        .ok()
        .filter(|&position| position > 0)
        .ok_or_else(|| Error::internal("Row source reported fewer matching rows than it returned"))
}

/// Replaces parseable timestamp fields with epoch milliseconds.
///
/// Values that are already numeric, null or unparseable are left as they are.
fn normalize_timestamps(mut row: Row, config: &PaginationConfig) -> Row {
    for field in &config.timestamp_fields {
        let Some(Value::String(text)) = row.get(field) else {
            continue;
        };

        match parse_timestamp(text) {
            Some(timestamp) => {
                row.insert(field.clone(), Value::from(timestamp.as_millisecond()));
            }
            None => {
                tracing::warn!(
                    target: TRACING_TARGET_PAGINATE,
                    field = %field,
                    value = %text,
                    "leaving unparseable timestamp as-is"
                );
            }
        }
    }

    row
}

/// Parses RFC 3339 instants, or civil date-times and dates taken as UTC.
fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();

    if let Ok(timestamp) = text.parse::<Timestamp>() {
        return Some(timestamp);
    }

    if let Ok(datetime) = text.parse::<DateTime>() {
        return datetime.to_zoned(TimeZone::UTC).ok().map(|z| z.timestamp());
    }

    text.parse::<Date>()
        .ok()
        .and_then(|date| date.to_zoned(TimeZone::UTC).ok())
        .map(|z| z.timestamp())
}
