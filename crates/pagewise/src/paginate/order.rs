//! Store order resolution.

use crate::types::{FieldMap, Order, OrderDirection, SortDirection};

/// Store order for a page query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrder {
    /// Ordering terms sent to the row source.
    pub order: Vec<Order>,
    /// Whether the store order is the reverse of the client-facing order.
    ///
    /// Set for backward paging: the rows nearest the cursor are fetched first
    /// and reversed again before they reach the client.
    pub flip: bool,
}

/// Derives the store order from the client's sort and paging direction.
///
/// The sort field is translated through `field_map` when one is given.
pub fn resolve_order(
    direction: SortDirection,
    sort: &str,
    field_map: Option<&FieldMap>,
    backward: bool,
) -> ResolvedOrder {
    let column = field_map
        .and_then(|field_map| field_map.column(sort))
        .unwrap_or(sort);

    let order = Order::new(column, OrderDirection::from(direction));
    let order = if backward { order.flipped() } else { order };

    ResolvedOrder {
        order: vec![order],
        flip: backward,
    }
}
