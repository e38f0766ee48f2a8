//! Pure role policy check.

use thiserror::Error;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden")]
    Forbidden { role: Role },
}

/// Authorize a role against an endpoint's allowed set.
///
/// - No IO
/// - No panics
/// - No hierarchy: `admin` is only allowed where the set lists it
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden { role })
    }
}
