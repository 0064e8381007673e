//! Pagination configuration.
//!
//! Page size bounds and row post-processing options are passed explicitly into
//! every pagination call through a [`PaginationConfig`] value.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, TRACING_TARGET_CONFIG};

// Configuration defaults
const DEFAULT_LIMIT: u32 = 10;
const DEFAULT_MAX_LIMIT: u32 = 100;

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_max_limit() -> u32 {
    DEFAULT_MAX_LIMIT
}

fn default_true() -> bool {
    true
}

fn default_timestamp_fields() -> Vec<String> {
    vec!["createdAt".to_owned(), "updatedAt".to_owned()]
}

/// Page size bounds and row post-processing options.
///
/// ## Example
///
/// ```rust
/// use pagewise::PaginationConfig;
///
/// let config = PaginationConfig::default().with_max_limit(50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "pagination configurations must be passed to a paginator"]
pub struct PaginationConfig {
    /// Page size used when neither `first` nor `last` is given
    #[cfg_attr(
        feature = "config",
        arg(
            long = "default-limit",
            env = "PAGEWISE_DEFAULT_LIMIT",
            default_value_t = DEFAULT_LIMIT
        )
    )]
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Largest accepted value for `first` and `last`
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-limit",
            env = "PAGEWISE_MAX_LIMIT",
            default_value_t = DEFAULT_MAX_LIMIT
        )
    )]
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    /// Whether one of `first` or `last` must be given
    #[cfg_attr(
        feature = "config",
        arg(
            long = "require-limit",
            env = "PAGEWISE_REQUIRE_LIMIT",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    #[serde(default = "default_true")]
    pub require_limit: bool,

    /// Result fields normalized to epoch milliseconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "timestamp-fields",
            env = "PAGEWISE_TIMESTAMP_FIELDS",
            value_delimiter = ',',
            default_values_t = default_timestamp_fields()
        )
    )]
    #[serde(default = "default_timestamp_fields")]
    pub timestamp_fields: Vec<String>,
}

impl PaginationConfig {
    /// Sets the page size used when no explicit size is given.
    pub fn with_default_limit(mut self, default_limit: u32) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Sets the largest accepted page size.
    pub fn with_max_limit(mut self, max_limit: u32) -> Self {
        self.max_limit = max_limit;
        self
    }

    /// Sets whether one of `first` or `last` must be given.
    pub fn with_require_limit(mut self, require_limit: bool) -> Self {
        self.require_limit = require_limit;
        self
    }

    /// Replaces the list of fields normalized to epoch milliseconds.
    pub fn with_timestamp_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.timestamp_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_limit == 0 {
            return Err(Error::validation("max_limit must be at least 1"));
        }

        if self.default_limit == 0 {
            return Err(Error::validation("default_limit must be at least 1"));
        }

        if self.default_limit > self.max_limit {
            return Err(Error::validation(format!(
                "default_limit ({}) must not exceed max_limit ({})",
                self.default_limit, self.max_limit
            )));
        }

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            default_limit = self.default_limit,
            max_limit = self.max_limit,
            require_limit = self.require_limit,
            timestamp_fields = ?self.timestamp_fields,
            "validated pagination configuration"
        );

        Ok(())
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            require_limit: true,
            timestamp_fields: default_timestamp_fields(),
        }
    }
}
