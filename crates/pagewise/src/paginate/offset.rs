//! Cursor to offset translation.

use std::future::Future;

use crate::{Cursor, Error, Result, TRACING_TARGET_PAGINATE};

/// Converts the relevant cursor into a store offset.
///
/// Forward cursors are used as-is: the cursor is the position of the last row
/// seen, so the next page starts exactly there. Backward cursors count from the
/// forward order and are translated into an offset within the reversed query,
/// which needs the number of rows matching the filter; `count` is only awaited
/// in that case, after the cursor has decoded successfully.
pub async fn resolve_offset<F, Fut>(cursor: Option<&Cursor>, flip: bool, count: F) -> Result<u64>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<u64>>,
{
    let Some(cursor) = cursor else {
        return Ok(0);
    };

    let position = cursor.decode()?;
    if !flip {
        return Ok(position);
    }

    let total = count().await?;
    let offset = i128::from(total) - i128::from(position) + 1;

    tracing::debug!(
        target: TRACING_TARGET_PAGINATE,
        position,
        total,
        offset = offset as i64,
        "translated backward cursor"
    );

    u64::try_from(offset).map_err(|_| Error::invalid_cursor())
}
