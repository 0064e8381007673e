//! Opaque connection cursors.
//!
//! A cursor encodes the 1-based position of a row within the full, unpaginated,
//! ordered result set as the base64 text of its decimal representation. Cursors
//! are only meaningful for the sort, direction and filter they were minted under.

use std::fmt;

use base64::prelude::*;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An opaque position within an ordered result set.
///
/// The wrapped text is kept as received; it is only decoded when an offset is
/// resolved, so malformed client input surfaces as a validation error there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Encodes a 1-based row position.
    pub fn encode(position: u64) -> Self {
        Self(BASE64_STANDARD.encode(position.to_string()))
    }

    /// Decodes the row position carried by this cursor.
    ///
    /// Fails with an invalid cursor error unless the cursor is base64 text of a
    /// positive decimal integer.
    pub fn decode(&self) -> Result<u64> {
        let bytes = BASE64_STANDARD
            .decode(self.0.as_bytes())
            .map_err(|_| Error::invalid_cursor())?;
        let text = std::str::from_utf8(&bytes).map_err(|_| Error::invalid_cursor())?;

        match text.parse::<u64>() {
            Ok(position) if position > 0 => Ok(position),
            _ => Err(Error::invalid_cursor()),
        }
    }

    /// Returns the encoded text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
