use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, rejection::JsonRejection},
    response::Response,
    routing::get,
};

use campus_auth::Role;
use campus_core::{DomainError, StudentProfileId};
use campus_store::{StudentProfileDraft, StudentProfileFilter, StudentProfilePatch};

use crate::app::routes::common;
use crate::app::{AppState, dto, errors};
use crate::context::CurrentUser;

const READ_ROLES: &[Role] = &[Role::Admin, Role::Helper, Role::Teacher];
const WRITE_ROLES: &[Role] = &[Role::Admin];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route(
            "/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
}

pub async fn list_students(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<dto::StudentListQuery>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let filter = StudentProfileFilter {
        class_id: query.class_id,
    };
    match state
        .store
        .list_student_profiles(&filter, &query.page_request())
    {
        Ok(page) => errors::ok("students", page),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn get_student(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let id: StudentProfileId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.student_profile_by_id(id) {
        Ok(Some(profile)) => errors::ok("student", profile),
        Ok(None) => errors::domain_error_response(DomainError::NotFound),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn create_student(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<dto::CreateStudentRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let created = state.store.create_student_profile(StudentProfileDraft {
        user_id: body.user_id,
        student_code: body.student_code,
        class_id: body.class_id,
        parent_name: body.parent_name,
        parent_phone: body.parent_phone,
        parent_email: body.parent_email,
    });
    match created {
        Ok(profile) => errors::created("student profile created", profile),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn update_student(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateStudentRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: StudentProfileId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    // `classId: null` clears membership; an absent field leaves it unchanged.
    let patch = StudentProfilePatch {
        class_id: body.class_id,
        parent_name: body.parent_name,
        parent_phone: body.parent_phone,
        parent_email: body.parent_email,
    };
    match state.store.update_student_profile(id, patch) {
        Ok(profile) => errors::ok("student profile updated", profile),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn delete_student(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: StudentProfileId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.delete_student_profile(id) {
        Ok(()) => errors::ok("student profile deleted", serde_json::Value::Null),
        Err(e) => errors::domain_error_response(e),
    }
}
