//! Opaque row predicate passed through to row sources.

use derive_more::{Deref, DerefMut, From, Into};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row predicate in the row store's own filtering language.
///
/// Pagination treats the predicate as opaque; only search injection adds a
/// disjunction under [`Filter::OR`]. Keys are column names or operators.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct Filter(Map<String, Value>);

impl Filter {
    /// Key holding a disjunction of predicates.
    pub const OR: &'static str = "$or";
    /// Key holding a conjunction of predicates.
    pub const AND: &'static str = "$and";

    /// Creates an empty filter matching every row.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate on `key`, replacing any previous one.
    pub fn with(mut self, key: impl Into<String>, predicate: impl Into<Value>) -> Self {
        self.0.insert(key.into(), predicate.into());
        self
    }

    /// Returns the filter as a JSON object.
    #[inline]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for Filter {
    type Error = crate::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(crate::Error::validation("Filter must be an object")),
        }
    }
}
