use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::rejection::JsonRejection,
    http::header::SET_COOKIE,
    response::Response,
};
use chrono::Utc;

use campus_auth::{
    AuthError, Role, clear_cookie, dummy_verify, hash_password, session_cookie, verify_password,
};
use campus_core::DomainError;
use campus_store::{Identity, IdentityDraft, IdentityPatch};

use crate::app::routes::common;
use crate::app::{AppState, dto, errors};
use crate::context::CurrentUser;

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Response {
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };

    let identity = match state.store.identity_by_email(&body.email) {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            // Unknown email pays the same hashing cost as a wrong password,
            // so response time does not reveal whether the account exists.
            dummy_verify(&body.password);
            return errors::unauthorized(AuthError::InvalidCredentials.to_string());
        }
        Err(e) => return errors::domain_error_response(e),
    };
    // One message for unknown email, wrong password and inactive account.
    // The hash is always checked first so the inactive path costs the same.
    let password_ok = verify_password(&identity.password_hash, &body.password);
    if !password_ok || !identity.is_active {
        return errors::unauthorized(AuthError::InvalidCredentials.to_string());
    }
    if !state.enabled_roles.contains(&identity.role) {
        return errors::forbidden("role is not enabled on this deployment");
    }

    issue_session(&state, identity, "login successful", false)
}

/// Self-service registration. The role is always `student`; staff identities
/// are created by an admin through `/users`.
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<dto::SignupRequest>, JsonRejection>,
) -> Response {
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(AuthError::WeakPassword) => {
            return errors::domain_error_response(DomainError::validation(
                "password",
                AuthError::WeakPassword.to_string(),
            ));
        }
        Err(e) => return errors::domain_error_response(DomainError::internal(e.to_string())),
    };

    let created = state.store.create_identity(IdentityDraft {
        email: body.email,
        password_hash,
        name: body.name,
        role: Role::Student,
        phone: body.phone,
        address: body.address,
        date_of_birth: body.date_of_birth,
        gender: body.gender,
    });
    match created {
        Ok(identity) => issue_session(&state, identity, "account created", true),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn logout(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut res = errors::ok("logged out", serde_json::Value::Null);
    res.headers_mut()
        .append(SET_COOKIE, clear_cookie(state.secure_cookies));
    res
}

pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    match state.store.identity_by_id(user.id) {
        Ok(Some(identity)) => errors::ok("authenticated identity", identity),
        Ok(None) => errors::domain_error_response(DomainError::NotFound),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn change_password(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<dto::ChangePasswordRequest>, JsonRejection>,
) -> Response {
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };

    let identity = match state.store.identity_by_id(user.id) {
        Ok(Some(identity)) => identity,
        Ok(None) => return errors::domain_error_response(DomainError::NotFound),
        Err(e) => return errors::domain_error_response(e),
    };
    if !verify_password(&identity.password_hash, &body.current_password) {
        return errors::domain_error_response(DomainError::validation(
            "currentPassword",
            "is incorrect",
        ));
    }

    let password_hash = match hash_password(&body.new_password) {
        Ok(h) => h,
        Err(AuthError::WeakPassword) => {
            return errors::domain_error_response(DomainError::validation(
                "newPassword",
                AuthError::WeakPassword.to_string(),
            ));
        }
        Err(e) => return errors::domain_error_response(DomainError::internal(e.to_string())),
    };
    let patch = IdentityPatch {
        password_hash: Some(password_hash),
        ..Default::default()
    };
    match state.store.update_identity(user.id, patch) {
        Ok(_) => errors::ok("password changed", serde_json::Value::Null),
        Err(e) => errors::domain_error_response(e),
    }
}

/// Attach a freshly issued session cookie to a success envelope carrying the
/// identity.
fn issue_session(
    state: &AppState,
    identity: Identity,
    message: &str,
    created: bool,
) -> Response {
    let now = Utc::now();
    let token = match state
        .tokens
        .issue(identity.id, &identity.email, identity.role, now)
    {
        Ok(t) => t,
        Err(e) => {
            return errors::domain_error_response(DomainError::internal(e.to_string()));
        }
    };
    let identity = state
        .store
        .record_login(identity.id, now)
        .unwrap_or(identity);

    let mut res = if created {
        errors::created(message, &identity)
    } else {
        errors::ok(message, &identity)
    };
    if let Some(cookie) = session_cookie(
        &token,
        state.tokens.lifetime().num_seconds(),
        state.secure_cookies,
    ) {
        res.headers_mut().append(SET_COOKIE, cookie);
    }
    res
}
