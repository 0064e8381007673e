//! Cursor pagination over offset-capable row stores.
//!
//! A request flows through argument validation, order resolution, offset
//! resolution, the row source and finally connection assembly. Every call is
//! independent; the only continuation state is carried by cursors.

mod builder;
mod offset;
mod order;
mod search;
mod validate;

pub use builder::{PageContext, build_connection};
pub use offset::resolve_offset;
pub use order::{ResolvedOrder, resolve_order};
pub use search::inject_search;
pub use validate::validate_args;

use crate::source::{QueryRequest, RawQuery, RawRowSource, RowSource, read_full_count};
use crate::types::{Connection, ConnectionArgs, FieldMap, Row};
use crate::{Error, PaginationConfig, Result, TRACING_TARGET_PAGINATE};

/// Turns connection arguments into row source queries and connections.
///
/// Holds only configuration, so a single paginator can serve any number of
/// concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginationConfig,
}

/// Validated request shape shared by both query modes.
struct Plan {
    page_size: u64,
    order: ResolvedOrder,
}

impl Paginator {
    /// Creates a paginator after validating `config`.
    pub fn new(config: PaginationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration of this paginator.
    #[inline]
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Pages through a structured row source.
    ///
    /// Issues at most two round trips: a count when paging backward from a
    /// cursor, then the page query itself.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_PAGINATE,
        fields(sort = ?args.sort, first = ?args.first, last = ?args.last)
    )]
    pub async fn paginate<S>(
        &self,
        source: &S,
        args: &ConnectionArgs,
        field_map: Option<&FieldMap>,
    ) -> Result<Connection>
    where
        S: RowSource + Sync,
    {
        let plan = self.plan(args, field_map)?;

        let filter = match &args.search {
            Some(search) => inject_search(args.filter.clone(), search, field_map),
            None => args.filter.clone(),
        };

        let offset =
            resolve_offset(args.cursor(), plan.order.flip, || source.count(&filter)).await?;

        let request = QueryRequest {
            limit: plan.page_size + 1,
            offset,
            order: plan.order.order,
            filter,
        };

        tracing::debug!(
            target: TRACING_TARGET_PAGINATE,
            limit = request.limit,
            offset = request.offset,
            order = ?request.order,
            flip = plan.order.flip,
            "querying row source"
        );

        let result = source.query(request).await?;

        let context = PageContext {
            page_size: plan.page_size,
            offset,
            count: result.count,
            flip: plan.order.flip,
        };

        build_connection(result.rows, context, field_map, &self.config)
    }

    /// Pages through a raw SQL fragment.
    ///
    /// The fragment's rows must carry a [`FULL_COUNT_COLUMN`]; it is read off
    /// the first row and removed from every node. Searches do not apply in this
    /// mode, since the fragment carries its own predicate.
    ///
    /// [`FULL_COUNT_COLUMN`]: crate::source::FULL_COUNT_COLUMN
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_PAGINATE,
        fields(sort = ?args.sort, first = ?args.first, last = ?args.last)
    )]
    pub async fn paginate_raw<S>(
        &self,
        source: &S,
        query: &RawQuery,
        args: &ConnectionArgs,
        field_map: Option<&FieldMap>,
    ) -> Result<Connection>
    where
        S: RawRowSource + Sync,
    {
        let plan = self.plan(args, field_map)?;

        if args.search.as_ref().is_some_and(|search| !search.is_empty()) {
            tracing::debug!(
                target: TRACING_TARGET_PAGINATE,
                "ignoring search for raw query"
            );
        }

        let offset = resolve_offset(args.cursor(), plan.order.flip, || async {
            let rows = source.query_raw(&query.sql, &query.replacements).await?;
            read_full_count(&rows)
        })
        .await?;

        let paged = query.paged(&plan.order.order, plan.page_size + 1, offset);

        tracing::debug!(
            target: TRACING_TARGET_PAGINATE,
            sql = %paged.sql,
            offset,
            flip = plan.order.flip,
            "querying raw row source"
        );

        let mut rows = source.query_raw(&paged.sql, &paged.replacements).await?;
        let count = read_full_count(&rows)?;
        strip_full_count(&mut rows);

        let context = PageContext {
            page_size: plan.page_size,
            offset,
            count,
            flip: plan.order.flip,
        };

        build_connection(rows, context, field_map, &self.config)
    }

    fn plan(&self, args: &ConnectionArgs, field_map: Option<&FieldMap>) -> Result<Plan> {
        validate_args(args, field_map, &self.config)?;

        let (Some(sort), Some(direction)) = (args.sort.as_deref(), args.direction) else {
            return Err(Error::validation("`sort` and `direction` must be provided"));
        };

        let page_size = args
            .first
            .or(args.last)
            .map_or(u64::from(self.config.default_limit), |size| size as u64);

        Ok(Plan {
            page_size,
            order: resolve_order(direction, sort, field_map, args.is_backward()),
        })
    }
}

fn strip_full_count(rows: &mut [Row]) {
    for row in rows {
        row.remove(crate::source::FULL_COUNT_COLUMN);
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::source::{MemoryRowSource, QueryResult};
    use crate::types::{Filter, OrderDirection, Search, SortDirection};
    use crate::{Cursor, ErrorKind};

    /// Wraps a row source and records every request it receives.
    #[derive(Default)]
    struct Recording {
        inner: MemoryRowSource,
        requests: Mutex<Vec<QueryRequest>>,
        counts: AtomicUsize,
    }

    impl Recording {
        fn with_rows(count: u64) -> Self {
            let rows = (1..=count)
                .map(|id| {
                    json!({ "id": id, "name": format!("user-{id:02}") })
                        .as_object()
                        .cloned()
                        .unwrap()
                })
                .collect();

            Self {
                inner: MemoryRowSource::new(rows),
                ..Self::default()
            }
        }

        fn requests(&self) -> Vec<QueryRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn counts(&self) -> usize {
            self.counts.load(Ordering::SeqCst)
        }
    }

    impl RowSource for Recording {
        fn query(&self, request: QueryRequest) -> impl Future<Output = Result<QueryResult>> + Send {
            self.requests.lock().unwrap().push(request.clone());
            self.inner.query(request)
        }

        fn count(&self, filter: &Filter) -> impl Future<Output = Result<u64>> + Send {
            self.counts.fetch_add(1, Ordering::SeqCst);
            self.inner.count(filter)
        }
    }

    impl RawRowSource for Recording {
        fn query_raw(
            &self,
            sql: &str,
            replacements: &[serde_json::Value],
        ) -> impl Future<Output = Result<Vec<Row>>> + Send {
            self.inner.query_raw(sql, replacements)
        }
    }

    struct Failing;

    impl RowSource for Failing {
        fn query(&self, _: QueryRequest) -> impl Future<Output = Result<QueryResult>> + Send {
            async { Err(Error::internal("connection refused")) }
        }

        fn count(&self, _: &Filter) -> impl Future<Output = Result<u64>> + Send {
            async { Ok(0) }
        }
    }

    fn ids(connection: &Connection) -> Vec<u64> {
        connection
            .edges
            .iter()
            .map(|edge| edge.node["id"].as_u64().unwrap())
            .collect()
    }

    fn positions(connection: &Connection) -> Vec<u64> {
        connection
            .edges
            .iter()
            .map(|edge| edge.cursor.decode().unwrap())
            .collect()
    }

    fn by_id() -> ConnectionArgs {
        ConnectionArgs::new("id", SortDirection::Asc)
    }

    #[tokio::test]
    async fn first_page_peeks_one_extra_row() {
        let source = Recording::with_rows(12);
        let connection = Paginator::default()
            .paginate(&source, &by_id().first(10), None)
            .await
            .unwrap();

        let request = &source.requests()[0];
        assert_eq!((request.limit, request.offset), (11, 0));
        assert_eq!(
            request.order,
            vec![crate::types::Order::new("id", OrderDirection::AscNullsLast)]
        );

        assert_eq!(positions(&connection), (1..=10).collect::<Vec<_>>());
        assert_eq!(connection.total_count, 10);
        assert_eq!(connection.full_count, 12);
        assert!(connection.page_info.has_next_page);
        assert!(!connection.page_info.has_previous_page);
        assert_eq!(source.counts(), 0);
    }

    #[tokio::test]
    async fn after_cursor_continues_forward() {
        let source = Recording::with_rows(12);
        let args = by_id().first(5).after(Cursor::encode(4));
        let connection = Paginator::default()
            .paginate(&source, &args, None)
            .await
            .unwrap();

        let request = &source.requests()[0];
        assert_eq!((request.limit, request.offset), (6, 4));
        assert_eq!(ids(&connection), vec![5, 6, 7, 8, 9]);
        assert_eq!(positions(&connection), vec![5, 6, 7, 8, 9]);
        assert!(connection.page_info.has_next_page);
    }

    #[tokio::test]
    async fn before_cursor_pages_backward_in_reverse() {
        let source = Recording::with_rows(12);
        let args = by_id().last(5).before(Cursor::encode(4));
        let connection = Paginator::default()
            .paginate(&source, &args, None)
            .await
            .unwrap();

        let request = &source.requests()[0];
        assert_eq!((request.limit, request.offset), (6, 12 - 4 + 1));
        assert_eq!(request.order[0].direction, OrderDirection::DescNullsLast);
        assert_eq!(source.counts(), 1);

        assert_eq!(ids(&connection), vec![1, 2, 3]);
        assert_eq!(positions(&connection), vec![1, 2, 3]);
        assert!(!connection.page_info.has_next_page);
        assert!(!connection.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn backward_cursors_match_forward_cursors() {
        let source = Recording::with_rows(12);
        let paginator = Paginator::default();

        let forward = paginator
            .paginate(&source, &by_id().first(5).after(Cursor::encode(4)), None)
            .await
            .unwrap();
        let backward = paginator
            .paginate(&source, &by_id().last(5).before(Cursor::encode(10)), None)
            .await
            .unwrap();

        assert_eq!(forward.edges, backward.edges);
        assert!(!backward.page_info.has_next_page);
        assert!(backward.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn tied_sort_keys_keep_cursors_stable_in_both_directions() {
        let source = MemoryRowSource::from_json(json!([
            { "id": 1, "k": "same" },
            { "id": 2, "k": "same" },
            { "id": 3, "k": "same" },
        ]))
        .unwrap();
        let paginator = Paginator::default();
        let args = ConnectionArgs::new("k", SortDirection::Asc);

        let forward = paginator
            .paginate(&source, &args.clone().first(3), None)
            .await
            .unwrap();
        let backward = paginator
            .paginate(&source, &args.last(3), None)
            .await
            .unwrap();

        assert_eq!(ids(&forward), vec![1, 2, 3]);
        assert_eq!(positions(&forward), vec![1, 2, 3]);
        assert_eq!(backward.edges, forward.edges);
    }

    #[tokio::test]
    async fn last_without_cursor_returns_the_tail() {
        let source = Recording::with_rows(12);
        let connection = Paginator::default()
            .paginate(&source, &by_id().last(5), None)
            .await
            .unwrap();

        assert_eq!(source.counts(), 0);
        assert_eq!(ids(&connection), vec![8, 9, 10, 11, 12]);
        assert_eq!(positions(&connection), vec![8, 9, 10, 11, 12]);
        assert!(connection.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn oversized_page_returns_everything() {
        let source = Recording::with_rows(4);
        let paginator = Paginator::default();

        for args in [by_id().first(10), by_id().last(10)] {
            let connection = paginator.paginate(&source, &args, None).await.unwrap();
            assert_eq!(ids(&connection), vec![1, 2, 3, 4]);
            assert!(!connection.page_info.has_next_page);
            assert!(!connection.page_info.has_previous_page);
        }
    }

    #[tokio::test]
    async fn empty_result_set() {
        let source = Recording::with_rows(0);
        let connection = Paginator::default()
            .paginate(&source, &by_id().first(3), None)
            .await
            .unwrap();

        assert!(connection.edges.is_empty());
        assert_eq!(connection.page_info.start_cursor, None);
        assert_eq!(connection.page_info.end_cursor, None);
        assert_eq!(connection.total_count, 0);
    }

    #[tokio::test]
    async fn undecodable_cursor_issues_no_query() {
        let source = Recording::with_rows(12);
        let args = by_id().first(5).after(Cursor::from("definitely not a cursor"));
        let error = Paginator::default()
            .paginate(&source, &args, None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.message(), "Invalid cursor");
        assert!(source.requests().is_empty());
        assert_eq!(source.counts(), 0);
    }

    #[tokio::test]
    async fn invalid_arguments_issue_no_query() {
        let source = Recording::with_rows(12);
        let error = Paginator::default()
            .paginate(&source, &by_id(), None)
            .await
            .unwrap_err();

        assert!(error.is_validation());
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn search_and_field_map_shape_the_query() {
        let source = Recording::with_rows(12);
        let field_map = FieldMap::new().with("key", "id").with("login", "name");
        let args = ConnectionArgs::new("key", SortDirection::Desc)
            .first(2)
            .with_filter(Filter::new().with("id", json!({ "$lte": 11 })))
            .with_search(Search::new("USER-1", ["login"]));

        let connection = Paginator::default()
            .paginate(&source, &args, Some(&field_map))
            .await
            .unwrap();

        let request = &source.requests()[0];
        assert_eq!(request.order[0].column, "id");
        assert!(request.filter.contains_key("id"));
        assert!(request.filter.contains_key(Filter::OR));

        let keys: Vec<u64> = connection
            .edges
            .iter()
            .map(|edge| edge.node["key"].as_u64().unwrap())
            .collect();
        // "user-10" and "user-11" match the prefix; "user-12" is filtered out.
        assert_eq!(keys, vec![11, 10]);
        assert_eq!(connection.full_count, 2);
        assert!(!connection.page_info.has_next_page);
        assert_eq!(connection.edges[0].node["login"], json!("user-11"));
        assert!(!connection.edges[0].node.contains_key("id"));
    }

    #[tokio::test]
    async fn default_limit_applies_when_sizes_are_optional() {
        let source = Recording::with_rows(12);
        let config = PaginationConfig::default()
            .with_require_limit(false)
            .with_default_limit(4);
        let connection = Paginator::new(config)
            .unwrap()
            .paginate(&source, &by_id(), None)
            .await
            .unwrap();

        assert_eq!(source.requests()[0].limit, 5);
        assert_eq!(connection.total_count, 4);
    }

    #[tokio::test]
    async fn raw_queries_page_both_ways() {
        let source = Recording::with_rows(12);
        let paginator = Paginator::default();
        let query = RawQuery::new("SELECT *, count(*) OVER () AS full_count FROM users");

        let forward = paginator
            .paginate_raw(&source, &query, &by_id().first(5).after(Cursor::encode(4)), None)
            .await
            .unwrap();
        assert_eq!(ids(&forward), vec![5, 6, 7, 8, 9]);
        assert_eq!(forward.full_count, 12);
        assert!(!forward.edges[0].node.contains_key("full_count"));

        let backward = paginator
            .paginate_raw(&source, &query, &by_id().last(5).before(Cursor::encode(10)), None)
            .await
            .unwrap();
        assert_eq!(backward.edges, forward.edges);
        assert!(backward.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn row_source_failures_are_masked_at_the_boundary() {
        let error = Paginator::default()
            .paginate(&Failing, &by_id().first(5), None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Internal);
        assert_eq!(error.message(), "connection refused");

        let public = error.into_public();
        assert_eq!(public.kind(), ErrorKind::Internal);
        assert_ne!(public.message(), "connection refused");
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let source = Recording::with_rows(12);
        let paginator = Paginator::default();

        let first = by_id().first(3);
        let last = by_id().last(3);
        let (a, b) = tokio::join!(
            paginator.paginate(&source, &first, None),
            paginator.paginate(&source, &last, None),
        );

        assert_eq!(ids(&a.unwrap()), vec![1, 2, 3]);
        assert_eq!(ids(&b.unwrap()), vec![10, 11, 12]);
    }
}
