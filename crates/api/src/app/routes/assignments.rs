use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, rejection::JsonRejection},
    response::Response,
    routing::{get, post, put},
};

use campus_auth::Role;
use campus_core::{AssignmentId, DomainError, StudentProfileId, TeacherProfileId};
use campus_store::{AssignmentDraft, AssignmentFilter, AssignmentPatch, SubmissionDraft};

use crate::app::routes::common;
use crate::app::{AppState, dto, errors};
use crate::context::CurrentUser;

const READ_ROLES: &[Role] = &[Role::Admin, Role::Teacher, Role::Student];
const WRITE_ROLES: &[Role] = &[Role::Admin, Role::Teacher];
const GRADE_ROLES: &[Role] = &[Role::Teacher, Role::Admin];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_assignments).post(create_assignment))
        .route(
            "/:id",
            get(get_assignment)
                .put(update_assignment)
                .delete(delete_assignment),
        )
        .route("/:id/submissions", post(submit_assignment))
        .route(
            "/:id/submissions/:student_id/grade",
            put(grade_submission),
        )
}

pub async fn list_assignments(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<dto::AssignmentListQuery>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let filter = AssignmentFilter {
        class_id: query.class_id,
        subject_id: query.subject_id,
        teacher_id: query.teacher_id,
    };
    match state.store.list_assignments(&filter, &query.page_request()) {
        Ok(page) => errors::ok("assignments", page),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn get_assignment(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, READ_ROLES) {
        return r;
    }
    let id: AssignmentId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.assignment_by_id(id) {
        Ok(Some(assignment)) => errors::ok("assignment", assignment),
        Ok(None) => errors::domain_error_response(DomainError::NotFound),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn create_assignment(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<dto::CreateAssignmentRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    // A teacher authors as themselves; an admin names the teacher explicitly.
    let teacher_id = match body.teacher_id {
        Some(id) => id,
        None => match own_teacher_profile(&state, &user) {
            Ok(id) => id,
            Err(r) => return r,
        },
    };
    let created = state.store.create_assignment(AssignmentDraft {
        class_id: body.class_id,
        subject_id: body.subject_id,
        teacher_id,
        title: body.title,
        description: body.description,
        due_date: body.due_date,
        total_marks: body.total_marks,
    });
    match created {
        Ok(assignment) => errors::created("assignment created", assignment),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn update_assignment(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateAssignmentRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: AssignmentId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let patch = AssignmentPatch {
        title: body.title,
        description: body.description,
        due_date: body.due_date,
        total_marks: body.total_marks,
    };
    match state.store.update_assignment(id, patch) {
        Ok(assignment) => errors::ok("assignment updated", assignment),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn delete_assignment(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: AssignmentId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.delete_assignment(id) {
        Ok(()) => errors::ok("assignment deleted", serde_json::Value::Null),
        Err(e) => errors::domain_error_response(e),
    }
}

/// A student submits for themselves; the profile is resolved from the
/// session, never taken from the payload.
pub async fn submit_assignment(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::SubmitAssignmentRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, &[Role::Student]) {
        return r;
    }
    let id: AssignmentId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let student_id = match state.store.student_profile_by_user(user.id) {
        Ok(Some(profile)) => profile.id,
        Ok(None) => {
            return errors::domain_error_response(DomainError::validation(
                "studentId",
                "no student profile for this account",
            ));
        }
        Err(e) => return errors::domain_error_response(e),
    };
    let submitted = state.store.submit_assignment(
        id,
        SubmissionDraft {
            student_id,
            content: body.content,
        },
    );
    match submitted {
        Ok(assignment) => errors::created("submission recorded", assignment),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn grade_submission(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((id, student_id)): Path<(String, String)>,
    body: Result<Json<dto::GradeSubmissionRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, GRADE_ROLES) {
        return r;
    }
    let id: AssignmentId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let student_id: StudentProfileId = match common::parse_id(&student_id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    match state
        .store
        .grade_submission(id, student_id, body.grade, body.feedback)
    {
        Ok(assignment) => errors::ok("submission graded", assignment),
        Err(e) => errors::domain_error_response(e),
    }
}

fn own_teacher_profile(
    state: &AppState,
    user: &CurrentUser,
) -> Result<TeacherProfileId, Response> {
    match state.store.teacher_profile_by_user(user.id) {
        Ok(Some(profile)) => Ok(profile.id),
        Ok(None) => Err(errors::domain_error_response(DomainError::validation(
            "teacherId",
            "required when the caller has no teacher profile",
        ))),
        Err(e) => Err(errors::domain_error_response(e)),
    }
}
