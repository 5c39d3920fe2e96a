//! Resource services.
//!
//! Every operation takes the caller's [`Principal`](crate::types::Principal),
//! asks [`policy::decide`](crate::policy::decide) for its scope, validates its
//! input, runs the scoped storage call and finally records an audit entry.
//! Nothing here branches on roles directly.

pub mod account;
pub mod activity;
pub mod departments;
pub mod files;
pub mod records;
pub mod requests;
pub mod users;

use crate::error::{Error, Result};

/// Trims `value` and fails with `InvalidInput` naming `field` if it is empty.
pub(crate) fn non_empty(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
