use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, rejection::JsonRejection},
    response::Response,
    routing::get,
};

use campus_auth::{AuthError, Role, hash_password};
use campus_core::{DomainError, UserId};
use campus_store::{IdentityDraft, IdentityFilter, IdentityPatch, IdentityRemoval};

use crate::app::routes::common;
use crate::app::{AppState, dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<dto::UserListQuery>,
) -> Response {
    if let Err(r) = common::require_role(&user, &[Role::Admin, Role::Helper]) {
        return r;
    }
    let filter = IdentityFilter {
        role: query.role,
        is_active: query.is_active,
    };
    match state.store.list_identities(&filter, &query.page_request()) {
        Ok(page) => errors::ok("users", page),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, &[Role::Admin, Role::Helper]) {
        return r;
    }
    let id: UserId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.identity_by_id(id) {
        Ok(Some(identity)) => errors::ok("user", identity),
        Ok(None) => errors::domain_error_response(DomainError::NotFound),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, &[Role::Admin]) {
        return r;
    }
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    if !state.enabled_roles.contains(&body.role) {
        return errors::domain_error_response(DomainError::validation(
            "role",
            "role is not enabled on this deployment",
        ));
    }

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
        role: body.role,
        phone: body.phone,
        address: body.address,
        date_of_birth: body.date_of_birth,
        gender: body.gender,
    });
    match created {
        Ok(identity) => errors::created("user created", identity),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, &[Role::Admin]) {
        return r;
    }
    let id: UserId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    if let Some(role) = body.role {
        if !state.enabled_roles.contains(&role) {
            return errors::domain_error_response(DomainError::validation(
                "role",
                "role is not enabled on this deployment",
            ));
        }
    }

    let password_hash = match body.password {
        Some(plaintext) => match hash_password(&plaintext) {
            Ok(h) => Some(h),
            Err(AuthError::WeakPassword) => {
                return errors::domain_error_response(DomainError::validation(
                    "password",
                    AuthError::WeakPassword.to_string(),
                ));
            }
            Err(e) => {
                return errors::domain_error_response(DomainError::internal(e.to_string()));
            }
        },
        None => None,
    };

    let patch = IdentityPatch {
        name: body.name,
        role: body.role,
        is_active: body.is_active,
        phone: body.phone,
        address: body.address,
        date_of_birth: body.date_of_birth,
        gender: body.gender,
        password_hash,
    };
    match state.store.update_identity(id, patch) {
        Ok(identity) => errors::ok("user updated", identity),
        Err(e) => errors::domain_error_response(e),
    }
}

/// Delete is soft when anything references the identity: the record flips to
/// inactive and stays queryable. A hard delete happens only when nothing
/// references it.
pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, &[Role::Admin]) {
        return r;
    }
    let id: UserId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.delete_identity(id) {
        Ok(IdentityRemoval::Deleted) => errors::ok("user deleted", serde_json::Value::Null),
        Ok(IdentityRemoval::Deactivated(identity)) => {
            errors::ok("user has dependents; deactivated instead", identity)
        }
        Err(e) => errors::domain_error_response(e),
    }
}
