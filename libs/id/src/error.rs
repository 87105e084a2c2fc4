//! ID parse errors.

use thiserror::Error;

/// Why a string is not a valid ID of the requested kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("ID is empty")]
    Empty,

    /// Missing `_`, or a prefix for another kind of ID.
    #[error("expected a '{expected}_' ID, got '{found}'")]
    WrongKind {
        expected: &'static str,
        found: String,
    },

    #[error("'{0}' is not a valid ULID")]
    BadUlid(String),
}
