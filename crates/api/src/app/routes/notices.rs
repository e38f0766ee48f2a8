use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, rejection::JsonRejection},
    response::Response,
    routing::get,
};
use chrono::Utc;
use serde::Serialize;

use campus_auth::Role;
use campus_core::{DomainError, NoticeId, Page};
use campus_store::{Notice, NoticeDraft, NoticeFilter, NoticePatch};

use crate::app::routes::common;
use crate::app::{AppState, dto, errors};
use crate::context::CurrentUser;

const WRITE_ROLES: &[Role] = &[Role::Admin, Role::Helper, Role::Teacher];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notices).post(create_notice))
        .route(
            "/:id",
            get(get_notice).put(update_notice).delete(delete_notice),
        )
}

/// A notice plus its computed visibility at response time.
#[derive(Debug, Serialize)]
struct NoticeView {
    #[serde(flatten)]
    notice: Notice,
    active: bool,
}

fn view(notice: Notice) -> NoticeView {
    let active = notice.is_active_at(Utc::now());
    NoticeView { notice, active }
}

/// Reads are open to any authenticated role.
pub async fn list_notices(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<dto::NoticeListQuery>,
) -> Response {
    let filter = NoticeFilter {
        kind: query.kind,
        priority: query.priority,
        pinned: query.pinned,
        active_only: query.active_only,
    };
    match state.store.list_notices(&filter, &query.page_request()) {
        Ok(page) => {
            let page = Page {
                data: page.data.into_iter().map(view).collect(),
                pagination: page.pagination,
            };
            errors::ok("notices", page)
        }
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn get_notice(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let id: NoticeId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.notice_by_id(id) {
        Ok(Some(notice)) => errors::ok("notice", view(notice)),
        Ok(None) => errors::domain_error_response(DomainError::NotFound),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn create_notice(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<dto::CreateNoticeRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let created = state.store.create_notice(NoticeDraft {
        author_id: user.id,
        title: body.title,
        content: body.content,
        kind: body.kind,
        priority: body.priority,
        audience: body.audience,
        start_date: body.start_date,
        end_date: body.end_date,
        pinned: body.pinned,
    });
    match created {
        Ok(notice) => errors::created("notice created", view(notice)),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn update_notice(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateNoticeRequest>, JsonRejection>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: NoticeId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::require_json(body) {
        Ok(b) => b,
        Err(r) => return r,
    };
    let patch = NoticePatch {
        title: body.title,
        content: body.content,
        kind: body.kind,
        priority: body.priority,
        audience: body.audience,
        start_date: body.start_date,
        end_date: body.end_date,
        pinned: body.pinned,
    };
    match state.store.update_notice(id, patch) {
        Ok(notice) => errors::ok("notice updated", view(notice)),
        Err(e) => errors::domain_error_response(e),
    }
}

pub async fn delete_notice(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = common::require_role(&user, WRITE_ROLES) {
        return r;
    }
    let id: NoticeId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    match state.store.delete_notice(id) {
        Ok(()) => errors::ok("notice deleted", serde_json::Value::Null),
        Err(e) => errors::domain_error_response(e),
    }
}
