//! Error types for the jangdan scheduler
//!
//! This module defines the crate-wide error enum. Rule parsing fails fast:
//! a bad calendar rule surfaces here at registration time instead of
//! silently scheduling nothing.

use thiserror::Error;

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scheduling or parsing calendar rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A calendar rule field failed grammar or bounds validation
    #[error("malformed {field} field: \"{segment}\"")]
    MalformedRule { field: String, segment: String },

    /// An absolute time was supplied where only a relative delay is meaningful
    #[error("recurring events require a relative delay, not an absolute time")]
    InvalidDelay,

    /// The handle no longer refers to a queued event
    #[error("event not found: already fired or cancelled")]
    NotFound,
}

impl Error {
    /// Create a malformed rule error for a specific field segment
    pub fn malformed(field: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::MalformedRule {
            field: field.into(),
            segment: segment.into(),
        }
    }
}
