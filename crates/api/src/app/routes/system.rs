use axum::response::Response;
use serde_json::json;

use crate::app::errors;

pub async fn health() -> Response {
    errors::ok("service is healthy", json!({ "status": "ok" }))
}
