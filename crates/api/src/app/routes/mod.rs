use axum::{
    Router,
    routing::{get, post, put},
};

pub mod assignments;
pub mod auth;
pub mod classes;
pub mod common;
pub mod notices;
pub mod students;
pub mod subjects;
pub mod system;
pub mod teachers;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .nest("/users", users::router())
        .nest("/students", students::router())
        .nest("/teachers", teachers::router())
        .nest("/classes", classes::router())
        .nest("/subjects", subjects::router())
        .nest("/assignments", assignments::router())
        .nest("/notices", notices::router())
}
