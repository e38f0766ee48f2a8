use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, rejection::JsonRejection},
    response::Response,
    routing::get,
};

use campus_auth::Role;
use campus_core::{DomainError, TeacherProfileId};
use campus_store::{TeacherProfileDraft, TeacherProfileFilter, TeacherProfilePatch};

use crate::app::routes::common;
use crate::app::{AppState, dto, errors};
use crate::context::CurrentUser;

const READ_ROLES: &[Role] = &[Role::Admin, Role::Helper];
const WRITE_ROLES: &[Role] = &[Role::Admin];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_teachers).post(create_teacher))
        .route(
            "/:id",
            get(get_teacher).put(update_teacher).delete(delete_teacher),
        )
}

pub async fn list_teachers(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<dto::TeacherListQuery>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let filter = TeacherProfileFilter {
        department: query.department.clone(),
    };
    match state
        .store
        .list_teacher_profiles(&filter, &query.page_request())
    {
        Ok(page) => errors::ok("teachers", page),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn get_teacher(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let id: TeacherProfileId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.teacher_profile_by_id(id) {
        Ok(Some(profile)) => errors::ok("teacher", profile),
        Ok(None) => errors::domain_error_response(DomainError::NotFound),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn create_teacher(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<dto::CreateTeacherRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let created = state.store.create_teacher_profile(TeacherProfileDraft {
        user_id: body.user_id,
        employee_code: body.employee_code,
        department: body.department,
        designation: body.designation,
        subject_ids: body.subject_ids,
        is_class_teacher: body.is_class_teacher,
        class_id: body.class_id,
    });
    match created {
        Ok(profile) => errors::created("teacher profile created", profile),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn update_teacher(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateTeacherRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: TeacherProfileId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let patch = TeacherProfilePatch {
        department: body.department,
        designation: body.designation,
        subject_ids: body.subject_ids,
        is_class_teacher: body.is_class_teacher,
        class_id: body.class_id,
    };
    match state.store.update_teacher_profile(id, patch) {
        Ok(profile) => errors::ok("teacher profile updated", profile),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn delete_teacher(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: TeacherProfileId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.delete_teacher_profile(id) {
        Ok(()) => errors::ok("teacher profile deleted", serde_json::Value::Null),
        Err(e) => errors::domain_error_response(e),
    }
}
