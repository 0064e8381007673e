//! Free-text search injection.

use serde_json::{Value, json};

use crate::types::{FieldMap, Filter, Search};

/// Merges a case-insensitive prefix search into `filter`.
///
/// Every searched field becomes an `$iLike` starts-with predicate on its
/// column, and the predicates are ORed together under [`Filter::OR`]. Other
/// filter keys are left untouched. Searches with an empty term or no fields
/// leave the filter unchanged.
pub fn inject_search(mut filter: Filter, search: &Search, field_map: Option<&FieldMap>) -> Filter {
    if search.is_empty() {
        return filter;
    }

    let pattern = format!("{}%", escape_like(&search.search_term));
    let predicates: Vec<Value> = search
        .columns
        .iter()
        .map(|field| {
            let column = field_map
                .and_then(|field_map| field_map.column(field))
                .unwrap_or(field);
            json!({ (column): { "$iLike": pattern } })
        })
        .collect();

    filter.insert(Filter::OR.to_owned(), Value::Array(predicates));
    filter
}

/// Escapes `LIKE` metacharacters so the term only matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
