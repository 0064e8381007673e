#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for pagination operations.
///
/// Use this target for logging argument validation, order and offset resolution,
/// and connection assembly.
pub const TRACING_TARGET_PAGINATE: &str = "pagewise::paginate";

/// Tracing target for row source operations.
///
/// Use this target for logging queries issued against a row source and their results.
pub const TRACING_TARGET_SOURCE: &str = "pagewise::source";

/// Tracing target for configuration handling.
pub const TRACING_TARGET_CONFIG: &str = "pagewise::config";

mod config;
mod error;
mod paginate;

pub mod cursor;
pub mod source;
pub mod types;

pub use crate::config::PaginationConfig;
pub use crate::cursor::Cursor;
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::paginate::{
    PageContext, Paginator, ResolvedOrder, build_connection, inject_search, resolve_offset,
    resolve_order, validate_args,
};
pub use crate::source::{
    FULL_COUNT_COLUMN, MemoryRowSource, QueryRequest, QueryResult, RawQuery, RawRowSource,
    RowSource, read_full_count,
};
pub use crate::types::{
    Connection, ConnectionArgs, Edge, FieldMap, Filter, Order, OrderDirection, PageInfo, Row,
    Search, SortDirection,
};
