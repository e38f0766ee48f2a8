use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, rejection::JsonRejection},
    response::Response,
    routing::get,
};

use campus_auth::Role;
use campus_core::{DomainError, SubjectId};
use campus_store::{SubjectDraft, SubjectFilter, SubjectPatch};

use crate::app::routes::common;
use crate::app::{AppState, dto, errors};
use crate::context::CurrentUser;

const READ_ROLES: &[Role] = &[Role::Admin, Role::Helper, Role::Teacher, Role::Student];
const WRITE_ROLES: &[Role] = &[Role::Admin];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_subjects).post(create_subject))
        .route(
            "/:id",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
}

pub async fn list_subjects(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<dto::SubjectListQuery>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let filter = SubjectFilter {
        kind: query.kind,
        department: query.department.clone(),
    };
    match state.store.list_subjects(&filter, &query.page_request()) {
        Ok(page) => errors::ok("subjects", page),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn get_subject(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let id: SubjectId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.subject_by_id(id) {
        Ok(Some(subject)) => errors::ok("subject", subject),
        Ok(None) => errors::domain_error_response(DomainError::NotFound),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn create_subject(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<dto::CreateSubjectRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let created = state.store.create_subject(SubjectDraft {
        code: body.code,
        name: body.name,
        department: body.department,
        kind: body.kind,
        credits: body.credits,
        total_marks: body.total_marks,
        passing_marks: body.passing_marks,
    });
    match created {
        Ok(subject) => errors::created("subject created", subject),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn update_subject(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateSubjectRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: SubjectId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let patch = SubjectPatch {
        name: body.name,
        department: body.department,
        kind: body.kind,
        credits: body.credits,
        total_marks: body.total_marks,
        passing_marks: body.passing_marks,
    };
    match state.store.update_subject(id, patch) {
        Ok(subject) => errors::ok("subject updated", subject),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn delete_subject(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: SubjectId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.delete_subject(id) {
        Ok(()) => errors::ok("subject deleted", serde_json::Value::Null),
        Err(e) => errors::domain_error_response(e),
    }
}
