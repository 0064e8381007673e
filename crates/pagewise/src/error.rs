//! Error types for pagination operations.

use std::borrow::Cow;

use strum::IntoStaticStr;
use thiserror::Error;

use crate::TRACING_TARGET_PAGINATE;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Row sources wrap their driver errors in this type when reporting
/// failures as [`ErrorKind::Internal`].
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Message returned to callers in place of internal failure details.
const PUBLIC_INTERNAL_MESSAGE: &str = "Something went wrong, please try again later";

/// Categories of errors that can occur while paginating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Caller misuse or stale/tampered input.
    ///
    /// Always surfaced verbatim and never retried.
    Validation,
    /// Anything else, including row source failures.
    Internal,
}

impl ErrorKind {
    /// Returns the snake_case name of this kind.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A structured error type for pagination operations.
#[derive(Debug, Error)]
#[error("{}: {message}", .kind.as_str())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: Cow<'static, str>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Creates the validation error reported for undecodable or out-of-range cursors.
    pub fn invalid_cursor() -> Self {
        Self::validation("Invalid cursor")
    }

    /// Replaces the message of this error.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this error was caused by the caller's input.
    #[inline]
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation)
    }

    /// Converts this error into the form that may be shown to a caller.
    ///
    /// Validation errors pass through unchanged. Every other error is logged with
    /// its full detail and replaced by a generic internal error.
    pub fn into_public(self) -> Self {
        if self.is_validation() {
            return self;
        }

        tracing::error!(
            target: TRACING_TARGET_PAGINATE,
            kind = self.kind.as_str(),
            error = %self,
            source = ?self.source,
            "pagination failed with an internal error"
        );

        Self::internal(PUBLIC_INTERNAL_MESSAGE)
    }
}
