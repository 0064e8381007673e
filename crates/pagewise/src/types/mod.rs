//! Value types exchanged with pagination callers and row sources.

mod args;
mod connection;
mod field_map;
mod filter;
mod order;

pub use args::{ConnectionArgs, Search, SortDirection};
pub use connection::{Connection, Edge, PageInfo};
pub use field_map::FieldMap;
pub use filter::Filter;
pub use order::{Order, OrderDirection};

/// A single result row, keyed by column or field name.
pub type Row = serde_json::Map<String, serde_json::Value>;
