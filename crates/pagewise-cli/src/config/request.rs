//! Connection request arguments.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pagewise::{ConnectionArgs, Cursor, FieldMap, Filter, RawQuery, Search, SortDirection};

/// Data source and connection arguments of a single request.
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// Path to a JSON file holding an array of objects
    #[arg(long, env = "PAGEWISE_DATA")]
    pub data: PathBuf,

    /// Field to order by
    #[arg(long)]
    pub sort: Option<String>,

    /// Order direction (asc or desc)
    #[arg(long)]
    pub direction: Option<SortDirection>,

    /// Number of rows to return, paging forward
    #[arg(long, allow_negative_numbers = true)]
    pub first: Option<i64>,

    /// Number of rows to return, paging backward
    #[arg(long, allow_negative_numbers = true)]
    pub last: Option<i64>,

    /// Cursor to page forward from
    #[arg(long)]
    pub after: Option<String>,

    /// Cursor to page backward from
    #[arg(long)]
    pub before: Option<String>,

    /// Case-insensitive prefix to search for
    #[arg(long)]
    pub search: Option<String>,

    /// Fields searched by --search
    #[arg(long, value_delimiter = ',')]
    pub search_columns: Vec<String>,

    /// Filter as a JSON object, e.g. '{"active": true}'
    #[arg(long)]
    pub filter: Option<String>,

    /// Field map as a JSON object of field names to columns
    #[arg(long)]
    pub field_map: Option<String>,

    /// Page through a raw SQL fragment instead of a structured query
    #[arg(long)]
    pub raw_sql: Option<String>,

    /// Print the connection on a single line
    #[arg(long)]
    pub compact: bool,
}

impl RequestArgs {
    /// Builds the connection arguments of this request.
    pub fn connection_args(&self) -> anyhow::Result<ConnectionArgs> {
        let filter = match &self.filter {
            Some(filter) => {
                let value: serde_json::Value =
                    serde_json::from_str(filter).context("--filter is not valid JSON")?;
                Filter::try_from(value).context("--filter must be a JSON object")?
            }
            None => Filter::new(),
        };

        let search = self
            .search
            .as_ref()
            .map(|term| Search::new(term.clone(), self.search_columns.iter().cloned()));

        Ok(ConnectionArgs {
            sort: self.sort.clone(),
            direction: self.direction,
            first: self.first,
            last: self.last,
            after: self.after.clone().map(Cursor::from),
            before: self.before.clone().map(Cursor::from),
            search,
            filter,
        })
    }

    /// Parses the field map of this request, if any.
    pub fn field_map(&self) -> anyhow::Result<Option<FieldMap>> {
        self.field_map
            .as_deref()
            .map(|raw| serde_json::from_str(raw).context("--field-map must be a JSON object of strings"))
            .transpose()
    }

    /// Returns the raw query of this request, if any.
    pub fn raw_query(&self) -> Option<RawQuery> {
        self.raw_sql.as_ref().map(RawQuery::new)
    }
}
