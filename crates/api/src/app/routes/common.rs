use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::response::Response;

use campus_auth::{Role, authorize};
use campus_core::DomainError;

use crate::app::errors;
use crate::context::CurrentUser;

/// Gate a handler on an explicit allowed-role set. No role implies another;
/// admin must be listed wherever it is permitted.
pub fn require_role(user: &CurrentUser, allowed: &[Role]) -> Result<(), Response> {
    authorize(user.role, allowed).map_err(|e| errors::forbidden(e.to_string()))
}

/// Parse a path segment into a typed id; failures become enveloped 400s.
pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_response)
}

/// Unwrap a JSON body, turning structural decode failures (missing fields,
/// wrong types, malformed JSON) into enveloped 400s.
pub fn require_json<T>(body: Result<axum::Json<T>, JsonRejection>) -> Result<T, Response> {
    match body {
        Ok(axum::Json(value)) => Ok(value),
        Err(rejection) => Err(errors::bad_request(rejection.body_text())),
    }
}
