//! Argument validation performed before any query is issued.

use crate::types::{ConnectionArgs, FieldMap};
use crate::{Error, PaginationConfig, Result};

/// Rejects malformed connection arguments.
///
/// Checks run in a fixed order and the first failure is reported.
pub fn validate_args(
    args: &ConnectionArgs,
    field_map: Option<&FieldMap>,
    config: &PaginationConfig,
) -> Result<()> {
    if args.first.is_none() && args.last.is_none() && config.require_limit {
        return Err(Error::validation(
            "One of `first` or `last` must be provided",
        ));
    }

    if args.first.is_some() && args.last.is_some() {
        return Err(Error::validation(
            "Only one of `first` or `last` may be provided",
        ));
    }

    if args.after.is_some() && args.before.is_some() {
        return Err(Error::validation(
            "Only one of `after` or `before` may be provided",
        ));
    }

    let sort = args
        .sort
        .as_deref()
        .filter(|sort| !sort.trim().is_empty())
        .ok_or_else(|| Error::validation("`sort` must be provided"))?;

    if args.direction.is_none() {
        return Err(Error::validation("`direction` must be provided"));
    }

    if let Some(field_map) = field_map {
        if !field_map.is_well_formed() {
            return Err(Error::validation(
                "Field map must be a non-empty mapping of field names to columns",
            ));
        }

        if field_map.column(sort).is_none() {
            return Err(Error::validation(format!(
                "Cannot sort by unknown field `{sort}`"
            )));
        }
    }

    for (name, value) in [("first", args.first), ("last", args.last)] {
        let Some(value) = value else {
            continue;
        };

        if value > i64::from(config.max_limit) {
            return Err(Error::validation(format!(
                "`{name}` must not exceed {}",
                config.max_limit
            )));
        }

        if value < 1 {
            return Err(Error::validation(format!("`{name}` must be at least 1")));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortDirection;
    use crate::{Cursor, ErrorKind};

    fn config() -> PaginationConfig {
        PaginationConfig::default().with_max_limit(50)
    }

    fn message(args: &ConnectionArgs, field_map: Option<&FieldMap>) -> String {
        let error = validate_args(args, field_map, &config()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
        error.message().to_owned()
    }

    fn args() -> ConnectionArgs {
        ConnectionArgs::new("name", SortDirection::Asc)
    }

    #[test]
    fn accepts_forward_and_backward_arguments() {
        assert!(validate_args(&args().first(10), None, &config()).is_ok());
        assert!(validate_args(&args().last(50).before(Cursor::encode(3)), None, &config()).is_ok());
    }

    #[test]
    fn requires_a_page_size() {
        assert!(message(&args(), None).contains("`first` or `last`"));

        let relaxed = config().with_require_limit(false);
        assert!(validate_args(&args(), None, &relaxed).is_ok());
    }

    #[test]
    fn rejects_both_page_sizes() {
        assert!(message(&args().first(1).last(1), None).starts_with("Only one of `first`"));
    }

    #[test]
    fn rejects_both_cursors() {
        let args = args()
            .first(5)
            .after(Cursor::encode(1))
            .before(Cursor::encode(9));
        assert!(message(&args, None).contains("`after` or `before`"));
    }

    #[test]
    fn requires_sort_and_direction() {
        let mut missing_sort = args().first(5);
        missing_sort.sort = Some("  ".into());
        assert_eq!(message(&missing_sort, None), "`sort` must be provided");

        let mut missing_direction = args().first(5);
        missing_direction.direction = None;
        assert_eq!(message(&missing_direction, None), "`direction` must be provided");
    }

    #[test]
    fn checks_field_map() {
        let empty = FieldMap::new();
        assert!(message(&args().first(5), Some(&empty)).starts_with("Field map"));

        let map = FieldMap::new().with("email", "email_address");
        assert_eq!(
            message(&args().first(5), Some(&map)),
            "Cannot sort by unknown field `name`"
        );

        let map = map.with("name", "full_name");
        assert!(validate_args(&args().first(5), Some(&map), &config()).is_ok());
    }

    #[test]
    fn enforces_page_size_bounds() {
        assert_eq!(message(&args().first(51), None), "`first` must not exceed 50");
        assert_eq!(message(&args().last(0), None), "`last` must be at least 1");
        assert_eq!(message(&args().first(-3), None), "`first` must be at least 1");
    }
}
