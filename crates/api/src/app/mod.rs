//! HTTP application wiring (Axum router + shared state).
//!
//! Layout:
//! - `routes/`: one file per resource (handlers + sub-router)
//! - `dto.rs`: request DTOs and query-string shapes
//! - `errors.rs`: the response envelope and domain-error translation

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::{Extension, Router, routing::get, routing::post};
use tower::{BoxError, ServiceBuilder, timeout::TimeoutLayer};

use campus_auth::{Role, TokenService, default_lifetime};
use campus_core::DomainError;
use campus_store::{EntityStore, MemoryStore};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Hard ceiling on request handling; the store never blocks this long, so a
/// hit means something is wedged and the client deserves an answer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

async fn handle_layer_error(err: BoxError) -> axum::response::Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        errors::request_timeout()
    } else {
        errors::domain_error_response(DomainError::internal(err.to_string()))
    }
}

/// Shared handler state.
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub tokens: Arc<TokenService>,
    pub secure_cookies: bool,
    pub enabled_roles: HashSet<Role>,
}

/// Build the full router over a fresh in-memory store.
pub fn build_app(config: AppConfig) -> Router {
    build_app_with_store(config, Arc::new(MemoryStore::new()))
}

/// Build the full router over a caller-supplied store (tests seed it first).
pub fn build_app_with_store(config: AppConfig, store: Arc<dyn EntityStore>) -> Router {
    let tokens = Arc::new(TokenService::new(
        config.session_secret.as_bytes(),
        default_lifetime(),
    ));
    let state = Arc::new(AppState {
        store: Arc::clone(&store),
        tokens: Arc::clone(&tokens),
        secure_cookies: config.secure_cookies,
        enabled_roles: config.enabled_roles.clone(),
    });
    let auth_state = middleware::AuthState {
        tokens,
        store,
        enabled_roles: Arc::new(config.enabled_roles),
    };

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/signup", post(routes::auth::signup))
        .layer(Extension(Arc::clone(&state)));

    let protected = routes::router()
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
        .layer(Extension(state));

    public.merge(protected).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_layer_error))
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
    )
}
