use std::collections::HashSet;
use std::sync::Arc;

use axum::{extract::State, middleware::Next, response::Response};
use chrono::Utc;

use campus_auth::{Role, TokenError, TokenService, extract_token};
use campus_store::EntityStore;

use crate::app::errors;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub store: Arc<dyn EntityStore>,
    pub enabled_roles: Arc<HashSet<Role>>,
}

/// Session-cookie authentication for every protected route.
///
/// Token claims name the identity; the store is re-checked on every request
/// so a deactivated account is shut out immediately, not at token expiry.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(req.headers()) else {
        return errors::unauthorized("authentication required");
    };

    let claims = match state.tokens.verify(&token, Utc::now()) {
        Ok(claims) => claims,
        Err(TokenError::Expired) => return errors::unauthorized("session has expired"),
        Err(TokenError::Invalid) => return errors::unauthorized("invalid session"),
    };

    let identity = match state.store.identity_by_id(claims.sub) {
        Ok(Some(identity)) => identity,
        Ok(None) => return errors::unauthorized("invalid session"),
        Err(e) => return errors::domain_error_response(e),
    };
    if !identity.is_active {
        return errors::unauthorized("account is deactivated");
    }
    if !state.enabled_roles.contains(&identity.role) {
        return errors::forbidden("role is not enabled on this deployment");
    }

    req.extensions_mut().insert(CurrentUser {
        id: identity.id,
        email: identity.email,
        role: identity.role,
    });

    next.run(req).await
}
