use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, rejection::JsonRejection},
    response::Response,
    routing::{delete, get, post},
};

use campus_auth::Role;
use campus_core::{ClassSectionId, DomainError, StudentProfileId};
use campus_store::{ClassSectionDraft, ClassSectionFilter, ClassSectionPatch};

use crate::app::routes::common;
use crate::app::{AppState, dto, errors};
use crate::context::CurrentUser;

const READ_ROLES: &[Role] = &[Role::Admin, Role::Helper, Role::Teacher];
const WRITE_ROLES: &[Role] = &[Role::Admin];
const ENROLL_ROLES: &[Role] = &[Role::Admin, Role::Helper];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route(
            "/:id",
            get(get_class).put(update_class).delete(delete_class),
        )
        .route("/:id/students", post(enroll_student))
        .route("/:id/students/:student_id", delete(unenroll_student))
}

pub async fn list_classes(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<dto::ClassListQuery>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let filter = ClassSectionFilter {
        academic_year: query.academic_year.clone(),
        is_active: query.is_active,
    };
    match state.store.list_classes(&filter, &query.page_request()) {
        Ok(page) => errors::ok("classes", page),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn get_class(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let id: ClassSectionId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.class_by_id(id) {
        Ok(Some(class)) => errors::ok("class", class),
        Ok(None) => errors::domain_error_response(DomainError::NotFound),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn create_class(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<dto::CreateClassRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let created = state.store.create_class(ClassSectionDraft {
        name: body.name,
        section: body.section,
        academic_year: body.academic_year,
        capacity: body.capacity,
        room: body.room,
        class_teacher: body.class_teacher,
        subjects: body.subjects,
    });
    match created {
        Ok(class) => errors::created("class created", class),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn update_class(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateClassRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: ClassSectionId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let patch = ClassSectionPatch {
        name: body.name,
        section: body.section,
        academic_year: body.academic_year,
        capacity: body.capacity,
        room: body.room,
        class_teacher: body.class_teacher,
        is_active: body.is_active,
        subjects: body.subjects,
    };
    match state.store.update_class(id, patch) {
        Ok(class) => errors::ok("class updated", class),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn delete_class(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: ClassSectionId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.delete_class(id) {
        Ok(()) => errors::ok("class deleted", serde_json::Value::Null),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn enroll_student(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::EnrollRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, ENROLL_ROLES) {
        return r;
    }
    let id: ClassSectionId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    match state.store.enroll_student(id, body.student_id) {
        Ok(class) => errors::ok("student enrolled", class),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn unenroll_student(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((id, student_id)): Path<(String, String)>,
) -> Response {
    if let Err(r) = common::require_role(&user, ENROLL_ROLES) {
        return r;
    }
    let id: ClassSectionId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let student_id: StudentProfileId = match common::parse_id(&student_id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.unenroll_student(id, student_id) {
        Ok(class) => errors::ok("student unenrolled", class),
        Err(e) => errors::domain_error_response(e),
    }
}
