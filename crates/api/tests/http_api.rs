//! Black-box HTTP tests: real server on an ephemeral port, real client,
//! cookie-based sessions.

use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};

use campus_api::app::build_app_with_store;
use campus_api::config::AppConfig;
use campus_auth::{Role, SessionClaims};
use campus_core::UserId;
use campus_store::MemoryStore;

const SECRET: &str = "test-secret";
const ADMIN_EMAIL: &str = "admin@campus.local";
const ADMIN_PASSWORD: &str = "admin-pass";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let store = Arc::new(MemoryStore::new());
        let hash = campus_auth::hash_password(ADMIN_PASSWORD).unwrap();
        store
            .seed_admin(ADMIN_EMAIL, &hash, "Administrator")
            .unwrap();

        let app = build_app_with_store(AppConfig::for_tests(SECRET), store);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

async fn login(client: &reqwest::Client, base_url: &str, email: &str, password: &str) -> Value {
    let res = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK, "login failed for {email}");
    res.json().await.unwrap()
}

/// Admin-side setup helper: create an identity through `/users`.
async fn create_user(
    admin: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
    role: &str,
) -> String {
    let res = admin
        .post(format!("{base_url}/users"))
        .json(&json!({
            "email": email,
            "password": password,
            "name": "Test Person",
            "role": role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

fn field_names(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = client()
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let srv = TestServer::spawn().await;
    let res = client()
        .get(format!("{}/users", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn login_sets_a_session_and_never_leaks_the_password_hash() {
    let srv = TestServer::spawn().await;
    let client = client();

    let body = login(&client, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password_hash").is_none());

    // Cookie carried automatically on the next request.
    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["data"]["role"], "admin");
    assert!(me["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn wrong_password_is_unauthorized_with_one_generic_message() {
    let srv = TestServer::spawn().await;
    let res = client()
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "invalid email or password");

    // Unknown email gets the identical message.
    let res = client()
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "nobody@campus.local", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "invalid email or password");
}

#[tokio::test]
async fn unknown_email_answers_no_faster_than_a_wrong_password() {
    let srv = TestServer::spawn().await;
    let client = client();

    let started = std::time::Instant::now();
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .unwrap();
    let wrong_password = started.elapsed();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let wrong_body: Value = res.json().await.unwrap();

    let started = std::time::Instant::now();
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "nobody@campus.local", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    let unknown_email = started.elapsed();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let unknown_body: Value = res.json().await.unwrap();

    // Identical envelopes, and the unknown-email path burns comparable
    // Argon2 work instead of returning in microseconds. The margin is wide
    // so scheduler jitter cannot flake the assertion; without the padding
    // verification the unknown path is orders of magnitude faster.
    assert_eq!(wrong_body, unknown_body);
    assert!(
        unknown_email * 4 >= wrong_password,
        "unknown email answered in {unknown_email:?}, wrong password in {wrong_password:?}"
    );
}

#[tokio::test]
async fn signup_forces_student_and_duplicate_email_conflicts() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client
        .post(format!("{}/auth/signup", srv.base_url))
        .json(&json!({
            "email": "ada@campus.local",
            "password": "lovelace",
            "name": "Ada",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["role"], "student");

    // Same email, case-folded, conflicts and names the field.
    let res = client
        .post(format!("{}/auth/signup", srv.base_url))
        .json(&json!({
            "email": "ADA@campus.local",
            "password": "lovelace",
            "name": "Ada Again",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(field_names(&body).contains(&"email".to_string()));
}

#[tokio::test]
async fn role_gating_has_no_implicit_hierarchy() {
    let srv = TestServer::spawn().await;
    let admin = client();
    login(&admin, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    create_user(
        &admin,
        &srv.base_url,
        "teacher@campus.local",
        "teach-pass",
        "teacher",
    )
    .await;

    let teacher = client();
    login(&teacher, &srv.base_url, "teacher@campus.local", "teach-pass").await;

    // /users is {admin, helper} only.
    let res = teacher
        .get(format!("{}/users", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    // Teachers can still read classes.
    let res = teacher
        .get(format!("{}/classes", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_session_token_is_rejected() {
    let srv = TestServer::spawn().await;

    let now = Utc::now();
    let claims = SessionClaims {
        sub: UserId::new(),
        email: ADMIN_EMAIL.to_string(),
        role: Role::Admin,
        issued_at: now - Duration::days(8),
        expires_at: now - Duration::days(1),
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let res = reqwest::Client::new()
        .get(format!("{}/auth/me", srv.base_url))
        .header("Cookie", format!("campus_session={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "session has expired");
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let srv = TestServer::spawn().await;
    let client = client();
    login(&client, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = client
        .post(format!("{}/auth/logout", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The clearing cookie is expired, so the store drops it.
    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn class_teacher_must_reference_an_existing_teacher() {
    let srv = TestServer::spawn().await;
    let admin = client();
    login(&admin, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = admin
        .post(format!("{}/classes", srv.base_url))
        .json(&json!({
            "name": "Grade 10",
            "section": "A",
            "academicYear": "2025-2026",
            "capacity": 30,
            "classTeacher": uuid::Uuid::now_v7(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(field_names(&body).contains(&"classTeacher".to_string()));
}

#[tokio::test]
async fn explicit_null_clears_the_class_teacher_but_an_absent_field_keeps_it() {
    let srv = TestServer::spawn().await;
    let admin = client();
    login(&admin, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let teacher_user = create_user(
        &admin,
        &srv.base_url,
        "head@campus.local",
        "teach-pass",
        "teacher",
    )
    .await;
    let res = admin
        .post(format!("{}/teachers", srv.base_url))
        .json(&json!({
            "userId": teacher_user,
            "employeeCode": "EMP-7",
            "department": "Science",
            "designation": "Lecturer",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let teacher_id = res.json::<Value>().await.unwrap()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = admin
        .post(format!("{}/classes", srv.base_url))
        .json(&json!({
            "name": "Grade 11",
            "section": "A",
            "academicYear": "2025-2026",
            "capacity": 30,
            "classTeacher": teacher_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let class_id = res.json::<Value>().await.unwrap()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // A patch that never mentions classTeacher leaves it alone.
    let res = admin
        .put(format!("{}/classes/{class_id}", srv.base_url))
        .json(&json!({ "room": "B-204" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["classTeacher"], teacher_id.as_str());

    // An explicit null clears it.
    let res = admin
        .put(format!("{}/classes/{class_id}", srv.base_url))
        .json(&json!({ "classTeacher": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["data"]["classTeacher"].is_null());
}

#[tokio::test]
async fn notice_with_inverted_window_names_both_date_fields() {
    let srv = TestServer::spawn().await;
    let admin = client();
    login(&admin, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = admin
        .post(format!("{}/notices", srv.base_url))
        .json(&json!({
            "title": "Sports day",
            "content": "Annual sports day",
            "type": "event",
            "startDate": "2025-03-01T00:00:00Z",
            "endDate": "2025-02-01T00:00:00Z",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    let fields = field_names(&body);
    assert!(fields.contains(&"startDate".to_string()));
    assert!(fields.contains(&"endDate".to_string()));
}

#[tokio::test]
async fn subject_referenced_by_an_assignment_cannot_be_deleted() {
    let srv = TestServer::spawn().await;
    let admin = client();
    login(&admin, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = admin
        .post(format!("{}/subjects", srv.base_url))
        .json(&json!({
            "code": "MATH101",
            "name": "Mathematics",
            "department": "Science",
            "type": "core",
            "credits": 4,
            "totalMarks": 100,
            "passingMarks": 35,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let subject: Value = res.json().await.unwrap();
    let subject_id = subject["data"]["id"].as_str().unwrap().to_string();

    let res = admin
        .post(format!("{}/classes", srv.base_url))
        .json(&json!({
            "name": "Grade 9",
            "section": "A",
            "academicYear": "2025-2026",
            "capacity": 30,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let class: Value = res.json().await.unwrap();
    let class_id = class["data"]["id"].as_str().unwrap().to_string();

    let teacher_user = create_user(
        &admin,
        &srv.base_url,
        "grader@campus.local",
        "teach-pass",
        "teacher",
    )
    .await;
    let res = admin
        .post(format!("{}/teachers", srv.base_url))
        .json(&json!({
            "userId": teacher_user,
            "employeeCode": "EMP-1",
            "department": "Science",
            "designation": "Lecturer",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let teacher: Value = res.json().await.unwrap();
    let teacher_id = teacher["data"]["id"].as_str().unwrap().to_string();

    let res = admin
        .post(format!("{}/assignments", srv.base_url))
        .json(&json!({
            "classId": class_id,
            "subjectId": subject_id,
            "teacherId": teacher_id,
            "title": "Problem set 1",
            "dueDate": "2026-01-15T00:00:00Z",
            "totalMarks": 20,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = admin
        .delete(format!("{}/subjects/{subject_id}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The subject is still there.
    let res = admin
        .get(format!("{}/subjects/{subject_id}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn student_submits_and_teacher_grades() {
    let srv = TestServer::spawn().await;
    let admin = client();
    login(&admin, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Subject, class, teacher and a student with a profile.
    let res = admin
        .post(format!("{}/subjects", srv.base_url))
        .json(&json!({
            "code": "ENG101", "name": "English", "department": "Arts",
            "type": "core", "credits": 3, "totalMarks": 50, "passingMarks": 20,
        }))
        .send()
        .await
        .unwrap();
    let subject_id = res.json::<Value>().await.unwrap()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = admin
        .post(format!("{}/classes", srv.base_url))
        .json(&json!({
            "name": "Grade 8", "section": "B",
            "academicYear": "2025-2026", "capacity": 30,
        }))
        .send()
        .await
        .unwrap();
    let class_id = res.json::<Value>().await.unwrap()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let teacher_user = create_user(
        &admin,
        &srv.base_url,
        "essay-teacher@campus.local",
        "teach-pass",
        "teacher",
    )
    .await;
    let res = admin
        .post(format!("{}/teachers", srv.base_url))
        .json(&json!({
            "userId": teacher_user,
            "employeeCode": "EMP-2",
            "department": "Arts",
            "designation": "Lecturer",
        }))
        .send()
        .await
        .unwrap();
    let teacher_id = res.json::<Value>().await.unwrap()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let student_user = create_user(
        &admin,
        &srv.base_url,
        "pupil@campus.local",
        "pupil-pass",
        "student",
    )
    .await;
    let res = admin
        .post(format!("{}/students", srv.base_url))
        .json(&json!({ "userId": student_user, "studentCode": "STU-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let student_id = res.json::<Value>().await.unwrap()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = admin
        .post(format!("{}/assignments", srv.base_url))
        .json(&json!({
            "classId": class_id,
            "subjectId": subject_id,
            "teacherId": teacher_id,
            "title": "Essay",
            "dueDate": "2026-02-01T00:00:00Z",
            "totalMarks": 50,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let assignment_id = res.json::<Value>().await.unwrap()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Student submits for themselves.
    let student = client();
    login(&student, &srv.base_url, "pupil@campus.local", "pupil-pass").await;
    let res = student
        .post(format!("{}/assignments/{assignment_id}/submissions", srv.base_url))
        .json(&json!({ "content": "my essay" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // An admin cannot submit (students only).
    let res = admin
        .post(format!("{}/assignments/{assignment_id}/submissions", srv.base_url))
        .json(&json!({ "content": "admin essay" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Teacher grades; a grade above totalMarks is rejected first.
    let teacher = client();
    login(
        &teacher,
        &srv.base_url,
        "essay-teacher@campus.local",
        "teach-pass",
    )
    .await;
    let grade_url = format!(
        "{}/assignments/{assignment_id}/submissions/{student_id}/grade",
        srv.base_url
    );
    let res = teacher
        .put(&grade_url)
        .json(&json!({ "grade": 60 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(field_names(&body).contains(&"grade".to_string()));

    let res = teacher
        .put(&grade_url)
        .json(&json!({ "grade": 42, "feedback": "well argued" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let submission = &body["data"]["submissions"][0];
    assert_eq!(submission["grade"], 42);
    assert_eq!(submission["status"], "graded");
}

#[tokio::test]
async fn list_envelopes_carry_pagination_metadata() {
    let srv = TestServer::spawn().await;
    let admin = client();
    login(&admin, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    for i in 0..12 {
        create_user(
            &admin,
            &srv.base_url,
            &format!("user{i}@campus.local"),
            "pass-word",
            "helper",
        )
        .await;
    }

    let res = admin
        .get(format!("{}/users?page=2&limit=5", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let page = &body["data"];
    assert_eq!(page["data"].as_array().unwrap().len(), 5);
    assert_eq!(page["pagination"]["page"], 2);
    assert_eq!(page["pagination"]["total"], 13); // 12 helpers + seeded admin
    assert_eq!(page["pagination"]["totalPages"], 3);
    assert_eq!(page["pagination"]["hasNext"], true);
    assert_eq!(page["pagination"]["hasPrev"], true);
}

#[tokio::test]
async fn malformed_body_is_an_enveloped_bad_request() {
    let srv = TestServer::spawn().await;
    let admin = client();
    login(&admin, &srv.base_url, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Missing required fields.
    let res = admin
        .post(format!("{}/subjects", srv.base_url))
        .json(&json!({ "code": "PHY101" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}
