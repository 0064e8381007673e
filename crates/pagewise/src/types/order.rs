//! Store-level ordering.

use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::SortDirection;

/// Store-level sort direction; nulls always sort last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub enum OrderDirection {
    /// `ASC NULLS LAST`
    #[serde(rename = "ASC NULLS LAST")]
    AscNullsLast,
    /// `DESC NULLS LAST`
    #[serde(rename = "DESC NULLS LAST")]
    DescNullsLast,
}

impl OrderDirection {
    /// Returns the SQL text of this direction.
    #[inline]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::AscNullsLast => "ASC NULLS LAST",
            Self::DescNullsLast => "DESC NULLS LAST",
        }
    }

    /// Returns the opposite direction, keeping nulls last.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Self::AscNullsLast => Self::DescNullsLast,
            Self::DescNullsLast => Self::AscNullsLast,
        }
    }

    /// Returns whether non-null values are ordered smallest first.
    #[inline]
    pub fn is_ascending(self) -> bool {
        matches!(self, Self::AscNullsLast)
    }
}

impl From<SortDirection> for OrderDirection {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::AscNullsLast,
            SortDirection::Desc => Self::DescNullsLast,
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A single `(column, direction)` ordering term sent to a row source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Order {
    /// Store column name.
    pub column: String,
    /// Sort direction, nulls last.
    pub direction: OrderDirection,
}

impl Order {
    /// Creates a new ordering term.
    #[inline]
    pub fn new(column: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Returns this ordering term with its direction inverted.
    #[inline]
    pub fn flipped(self) -> Self {
        Self {
            column: self.column,
            direction: self.direction.flipped(),
        }
    }

    /// Renders this term as an `ORDER BY` item with a quoted column identifier.
    pub fn to_sql(&self) -> String {
        format!(
            "\"{}\" {}",
            self.column.replace('"', "\"\""),
            self.direction.as_sql()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flipping_keeps_nulls_last() {
        assert_eq!(
            OrderDirection::AscNullsLast.flipped(),
            OrderDirection::DescNullsLast
        );
        assert_eq!(
            OrderDirection::DescNullsLast.flipped().as_sql(),
            "ASC NULLS LAST"
        );
    }

    #[test]
    fn renders_quoted_sql() {
        let order = Order::new("created_at", OrderDirection::DescNullsLast);
        assert_eq!(order.to_sql(), "\"created_at\" DESC NULLS LAST");

        let order = Order::new("we\"ird", OrderDirection::AscNullsLast);
        assert_eq!(order.to_sql(), "\"we\"\"ird\" ASC NULLS LAST");
    }
}
