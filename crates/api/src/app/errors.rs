//! The one response envelope every endpoint speaks.
//!
//! Success: `{ "success": true, "message": ..., "data": ... }`
//! Error:   `{ "success": false, "message": ..., "errors": [...]|null }`

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use campus_core::DomainError;

pub fn ok<T: Serialize>(message: &str, data: T) -> axum::response::Response {
    envelope(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: &str, data: T) -> axum::response::Response {
    envelope(StatusCode::CREATED, message, data)
}

fn envelope<T: Serialize>(
    status: StatusCode,
    message: &str,
    data: T,
) -> axum::response::Response {
    (
        status,
        Json(json!({
            "success": true,
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}

pub fn unauthorized(message: impl Into<String>) -> axum::response::Response {
    failure(StatusCode::UNAUTHORIZED, message.into(), None)
}

pub fn forbidden(message: impl Into<String>) -> axum::response::Response {
    failure(StatusCode::FORBIDDEN, message.into(), None)
}

pub fn bad_request(message: impl Into<String>) -> axum::response::Response {
    failure(StatusCode::BAD_REQUEST, message.into(), None)
}

pub fn request_timeout() -> axum::response::Response {
    failure(StatusCode::REQUEST_TIMEOUT, "request timed out".to_string(), None)
}

/// Translate a domain error into its HTTP shape. Internal detail is logged,
/// never echoed to the client.
pub fn domain_error_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(fields) => failure(
            StatusCode::BAD_REQUEST,
            "validation failed".to_string(),
            Some(serde_json::to_value(&fields).unwrap_or_default()),
        ),
        DomainError::Conflict { field, message } => failure(
            StatusCode::CONFLICT,
            message.clone(),
            Some(json!([{ "field": field, "message": message }])),
        ),
        DomainError::NotFound => {
            failure(StatusCode::NOT_FOUND, "resource not found".to_string(), None)
        }
        DomainError::Internal(detail) => {
            tracing::error!(%detail, "internal error");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
                None,
            )
        }
    }
}

fn failure(
    status: StatusCode,
    message: String,
    errors: Option<serde_json::Value>,
) -> axum::response::Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "errors": errors,
        })),
    )
        .into_response()
}
