//! In-memory row source.
//!
//! Evaluates a small filter vocabulary and `NULLS LAST` ordering over a fixed
//! set of rows. Useful for tests, fixtures and paging over JSON documents.

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{FULL_COUNT_COLUMN, QueryRequest, QueryResult, RawRowSource, RowSource};
use crate::types::{Filter, Order, OrderDirection, Row};
use crate::{Error, Result, TRACING_TARGET_SOURCE};

/// Row source backed by an immutable, shared set of rows.
///
/// Supported predicates: `$or`, `$and`, plain equality, and per-column
/// operator objects using `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`,
/// `$like` and `$iLike`.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    rows: Arc<[Row]>,
}

impl MemoryRowSource {
    /// Creates a row source over the given rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows: rows.into() }
    }

    /// Creates a row source from a JSON array of objects.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(Error::validation("Rows must be a JSON array of objects"));
        };

        let rows = items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                _ => Err(Error::validation("Rows must be a JSON array of objects")),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(rows))
    }

    /// Returns the number of rows held.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether no rows are held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn matching(&self, filter: &Filter) -> Result<Vec<&Row>> {
        let mut matched = Vec::new();
        for row in self.rows.iter() {
            if matches_filter(filter.as_map(), row)? {
                matched.push(row);
            }
        }

        Ok(matched)
    }

    fn select(&self, request: &QueryRequest) -> Result<QueryResult> {
        let mut matched = self.matching(&request.filter)?;
        let count = matched.len() as u64;

        sort_rows(&mut matched, &request.order);

        let rows = matched
            .into_iter()
            .skip(saturating_usize(request.offset))
            .take(saturating_usize(request.limit))
            .cloned()
            .collect();

        Ok(QueryResult::new(rows, count))
    }
}

impl RowSource for MemoryRowSource {
    fn query(&self, request: QueryRequest) -> impl Future<Output = Result<QueryResult>> + Send {
        let result = self.select(&request);

        if let Ok(result) = &result {
            tracing::debug!(
                target: TRACING_TARGET_SOURCE,
                limit = request.limit,
                offset = request.offset,
                returned = result.rows.len(),
                count = result.count,
                "queried in-memory rows"
            );
        }

        std::future::ready(result)
    }

    fn count(&self, filter: &Filter) -> impl Future<Output = Result<u64>> + Send {
        std::future::ready(self.matching(filter).map(|rows| rows.len() as u64))
    }
}

impl RawRowSource for MemoryRowSource {
    /// Runs a raw query over every held row.
    ///
    /// SQL text cannot be evaluated in memory: only a trailing
    /// `ORDER BY "column" <direction> LIMIT ? OFFSET ?` clause is honored, with
    /// limit and offset read from the last two replacements.
    fn query_raw(
        &self,
        sql: &str,
        replacements: &[Value],
    ) -> impl Future<Output = Result<Vec<Row>>> + Send {
        std::future::ready(self.select_raw(sql, replacements))
    }
}

impl MemoryRowSource {
    fn select_raw(&self, sql: &str, replacements: &[Value]) -> Result<Vec<Row>> {
        let full_count = self.rows.len() as u64;
        let mut rows: Vec<&Row> = self.rows.iter().collect();

        let (order, paged) = parse_trailing_clause(sql)?;
        sort_rows(&mut rows, &order);

        let (limit, offset) = if paged {
            let [.., limit, offset] = replacements else {
                return Err(Error::internal("Missing LIMIT/OFFSET replacements"));
            };
            let limit = limit
                .as_u64()
                .ok_or_else(|| Error::internal("LIMIT replacement must be a non-negative integer"))?;
            let offset = offset
                .as_u64()
                .ok_or_else(|| Error::internal("OFFSET replacement must be a non-negative integer"))?;
            (saturating_usize(limit), saturating_usize(offset))
        } else {
            (usize::MAX, 0)
        };

        tracing::debug!(
            target: TRACING_TARGET_SOURCE,
            sql = sql,
            replacements = replacements.len(),
            full_count,
            "ran raw query over in-memory rows"
        );

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| {
                let mut row = row.clone();
                row.insert(FULL_COUNT_COLUMN.to_owned(), Value::from(full_count));
                row
            })
            .collect())
    }
}

fn saturating_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Splits the appended `ORDER BY ... LIMIT ? OFFSET ?` clause off a raw query.
fn parse_trailing_clause(sql: &str) -> Result<(Vec<Order>, bool)> {
    let sql = sql.trim_end();
    let (body, paged) = match sql.strip_suffix("LIMIT ? OFFSET ?") {
        Some(body) => (body.trim_end(), true),
        None => (sql, false),
    };

    let Some(index) = body.rfind("ORDER BY ") else {
        return Ok((Vec::new(), paged));
    };

    let mut order = Vec::new();
    for term in body[index + "ORDER BY ".len()..].split(", ") {
        order.push(parse_order_term(term.trim())?);
    }

    Ok((order, paged))
}

fn parse_order_term(term: &str) -> Result<Order> {
    let malformed = || Error::internal(format!("Unsupported ORDER BY term `{term}`"));

    let rest = term.strip_prefix('"').ok_or_else(malformed)?;
    let mut column = String::new();
    let mut chars = rest.char_indices().peekable();
    let mut end = None;
    while let Some((i, c)) = chars.next() {
        if c == '"' {
            if chars.peek().is_some_and(|&(_, n)| n == '"') {
                chars.next();
                column.push('"');
            } else {
                end = Some(i + 1);
                break;
            }
        } else {
            column.push(c);
        }
    }

    let direction = match rest[end.ok_or_else(malformed)?..].trim() {
        "ASC NULLS LAST" => OrderDirection::AscNullsLast,
        "DESC NULLS LAST" => OrderDirection::DescNullsLast,
        _ => return Err(malformed()),
    };

    Ok(Order::new(column, direction))
}

fn sort_rows<'a>(rows: &mut [&'a Row], order: &[Order]) {
    let Some(last) = order.last() else {
        return;
    };

    // Ties fall back to insertion order, reversed along with the last term so
    // a flipped order is the exact reverse of the original.
    let mut indexed: Vec<(usize, &'a Row)> = rows.iter().copied().enumerate().collect();
    indexed.sort_by(|(index_a, a), (index_b, b)| {
        order
            .iter()
            .map(|term| compare_ordered(a.get(&term.column), b.get(&term.column), term.direction))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| {
                let ordering = index_a.cmp(index_b);
                if last.direction.is_ascending() {
                    ordering
                } else {
                    ordering.reverse()
                }
            })
    });

    for (slot, (_, row)) in rows.iter_mut().zip(indexed) {
        *slot = row;
    }
}

/// Compares two column values, nulls last in either direction.
fn compare_ordered(a: Option<&Value>, b: Option<&Value>, direction: OrderDirection) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = total_cmp(a, b);
            if direction.is_ascending() {
                ordering
            } else {
                ordering.reverse()
            }
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn total_cmp(a: &Value, b: &Value) -> Ordering {
    compare_values(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn matches_filter(filter: &Map<String, Value>, row: &Row) -> Result<bool> {
    for (key, predicate) in filter {
        let matched = match key.as_str() {
            Filter::OR => any_matches(predicate, row)?,
            Filter::AND => all_match(predicate, row)?,
            column => matches_column(row.get(column).unwrap_or(&Value::Null), predicate)?,
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn sub_filters(predicate: &Value) -> Result<impl Iterator<Item = &Map<String, Value>>> {
    let Value::Array(items) = predicate else {
        return Err(Error::validation("`$or` and `$and` expect an array of filters"));
    };

    items
        .iter()
        .map(|item| {
            item.as_object()
                .ok_or_else(|| Error::validation("`$or` and `$and` expect an array of filters"))
        })
        .collect::<Result<Vec<_>>>()
        .map(Vec::into_iter)
}

fn any_matches(predicate: &Value, row: &Row) -> Result<bool> {
    for filter in sub_filters(predicate)? {
        if matches_filter(filter, row)? {
            return Ok(true);
        }
    }

    Ok(false)
}

fn all_match(predicate: &Value, row: &Row) -> Result<bool> {
    for filter in sub_filters(predicate)? {
        if !matches_filter(filter, row)? {
            return Ok(false);
        }
    }

    Ok(true)
}

fn matches_column(value: &Value, predicate: &Value) -> Result<bool> {
    let Value::Object(operators) = predicate else {
        return Ok(value == predicate);
    };

    if !operators.keys().all(|key| key.starts_with('$')) {
        return Ok(value == predicate);
    }

    for (operator, operand) in operators {
        let matched = match operator.as_str() {
            "$eq" => value == operand,
            "$ne" => value != operand,
            "$gt" => compare_values(value, operand).is_some_and(Ordering::is_gt),
            "$gte" => compare_values(value, operand).is_some_and(Ordering::is_ge),
            "$lt" => compare_values(value, operand).is_some_and(Ordering::is_lt),
            "$lte" => compare_values(value, operand).is_some_and(Ordering::is_le),
            "$in" => operand
                .as_array()
                .ok_or_else(|| Error::validation("`$in` expects an array"))?
                .contains(value),
            "$like" => like(value, operand, false)?,
            "$iLike" => like(value, operand, true)?,
            other => {
                return Err(Error::validation(format!(
                    "Unsupported filter operator `{other}`"
                )));
            }
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn like(value: &Value, pattern: &Value, case_insensitive: bool) -> Result<bool> {
    let pattern = pattern
        .as_str()
        .ok_or_else(|| Error::validation("LIKE patterns must be strings"))?;

    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => return Ok(false),
    };

    if case_insensitive {
        Ok(like_match(&text.to_lowercase(), &pattern.to_lowercase()))
    } else {
        Ok(like_match(&text, pattern))
    }
}

/// SQL `LIKE` matching with `%`, `_` and backslash escapes.
fn like_match(text: &str, pattern: &str) -> bool {
    enum Token {
        Any,
        One,
        Char(char),
    }

    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::Any,
            '_' => Token::One,
            '\\' => Token::Char(chars.next().unwrap_or('\\')),
            c => Token::Char(c),
        });
    }

    let text: Vec<char> = text.chars().collect();

    // matched[j]: the first i text chars match the first j tokens.
    let mut matched = vec![false; tokens.len() + 1];
    matched[0] = true;
    for (j, token) in tokens.iter().enumerate() {
        matched[j + 1] = matched[j] && matches!(token, Token::Any);
    }

    for &c in &text {
        let mut next = vec![false; tokens.len() + 1];
        for (j, token) in tokens.iter().enumerate() {
            next[j + 1] = match token {
                Token::Any => next[j] || matched[j + 1],
                Token::One => matched[j],
                Token::Char(expected) => matched[j] && *expected == c,
            };
        }
        matched = next;
    }

    matched[tokens.len()]
}
