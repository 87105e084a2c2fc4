//! # dayplan-id
//!
//! Typed identifiers for the dayplan scheduler.
//!
//! All IDs use a prefixed format: `{prefix}_{ulid}`, for example
//! `task_01HV4Z2WQXKJNM8GPQY6VBKC3D`. The prefix keeps task IDs and request
//! IDs from being mixed up, and the ULID keeps them sortable by creation time.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

#[doc(hidden)]
pub use ulid::Ulid;

/// Split `s` into its ULID, checking the prefix. Shared by every
/// [`define_id!`] type.
#[doc(hidden)]
pub fn parse_prefixed(s: &str, prefix: &'static str) -> Result<Ulid, IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    match s.split_once('_') {
        Some((found, raw)) if found == prefix => {
            raw.parse().map_err(|_| IdError::BadUlid(raw.to_string()))
        }
        _ => Err(IdError::WrongKind {
            expected: prefix,
            found: s.to_string(),
        }),
    }
}
