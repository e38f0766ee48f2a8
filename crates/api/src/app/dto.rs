//! Request DTOs and query-string shapes.
//!
//! All request bodies are camelCase JSON. DTOs stay dumb: structural decode
//! here, semantic validation in the store layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use campus_auth::Role;
use campus_core::{
    ClassSectionId, PageRequest, SortOrder, StudentProfileId, SubjectId, TeacherProfileId, UserId,
};
use campus_store::{
    Audience, Gender, NoticeKind, NoticePriority, SubjectAssignment, SubjectKind,
};

/// For nullable reference fields in update bodies: an absent field is `None`
/// (leave unchanged), an explicit `null` is `Some(None)` (clear), a value is
/// `Some(Some(v))`. Pair with `#[serde(default)]` for the absent case.
fn clearable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// ── Auth ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub password: Option<String>,
}

// ── Role profiles ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub user_id: UserId,
    pub student_code: String,
    pub class_id: Option<ClassSectionId>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub parent_email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[serde(default, deserialize_with = "clearable")]
    pub class_id: Option<Option<ClassSectionId>>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub parent_email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    pub user_id: UserId,
    pub employee_code: String,
    pub department: String,
    pub designation: String,
    #[serde(default)]
    pub subject_ids: Vec<SubjectId>,
    #[serde(default)]
    pub is_class_teacher: bool,
    pub class_id: Option<ClassSectionId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeacherRequest {
    pub department: Option<String>,
    pub designation: Option<String>,
    pub subject_ids: Option<Vec<SubjectId>>,
    pub is_class_teacher: Option<bool>,
    #[serde(default, deserialize_with = "clearable")]
    pub class_id: Option<Option<ClassSectionId>>,
}

// ── Classes ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: String,
    pub section: String,
    pub academic_year: String,
    pub capacity: u32,
    pub room: Option<String>,
    pub class_teacher: Option<TeacherProfileId>,
    #[serde(default)]
    pub subjects: Vec<SubjectAssignment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub section: Option<String>,
    pub academic_year: Option<String>,
    pub capacity: Option<u32>,
    pub room: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub class_teacher: Option<Option<TeacherProfileId>>,
    pub is_active: Option<bool>,
    pub subjects: Option<Vec<SubjectAssignment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub student_id: StudentProfileId,
}

// ── Subjects ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub code: String,
    pub name: String,
    pub department: String,
    #[serde(rename = "type")]
    pub kind: SubjectKind,
    pub credits: u32,
    pub total_marks: u32,
    pub passing_marks: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<SubjectKind>,
    pub credits: Option<u32>,
    pub total_marks: Option<u32>,
    pub passing_marks: Option<u32>,
}

// ── Assignments ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    pub class_id: ClassSectionId,
    pub subject_id: SubjectId,
    pub teacher_id: Option<TeacherProfileId>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub total_marks: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub total_marks: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssignmentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSubmissionRequest {
    pub grade: u32,
    pub feedback: Option<String>,
}

// ── Notices ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoticeRequest {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: NoticeKind,
    #[serde(default = "default_priority")]
    pub priority: NoticePriority,
    #[serde(default = "default_audience")]
    pub audience: Vec<Audience>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pinned: bool,
}

fn default_priority() -> NoticePriority {
    NoticePriority::Normal
}

fn default_audience() -> Vec<Audience> {
    vec![Audience::All]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoticeRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<NoticeKind>,
    pub priority: Option<NoticePriority>,
    pub audience: Option<Vec<Audience>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub pinned: Option<bool>,
}

// ── Query strings ───────────────────────────────────────────────────────────

// Pagination fields are repeated per struct: `serde(flatten)` does not
// survive the query-string deserializer for non-string fields.
macro_rules! impl_page_request {
    ($ty:ty) => {
        impl $ty {
            pub fn page_request(&self) -> PageRequest {
                PageRequest::new(
                    self.page,
                    self.limit,
                    self.search.clone(),
                    self.sort_by.clone(),
                    self.sort_order,
                )
            }
        }
    };
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}
impl_page_request!(UserListQuery);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub class_id: Option<ClassSectionId>,
}
impl_page_request!(StudentListQuery);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub department: Option<String>,
}
impl_page_request!(TeacherListQuery);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub academic_year: Option<String>,
    pub is_active: Option<bool>,
}
impl_page_request!(ClassListQuery);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    #[serde(rename = "type")]
    pub kind: Option<SubjectKind>,
    pub department: Option<String>,
}
impl_page_request!(SubjectListQuery);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub class_id: Option<ClassSectionId>,
    pub subject_id: Option<SubjectId>,
    pub teacher_id: Option<TeacherProfileId>,
}
impl_page_request!(AssignmentListQuery);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    #[serde(rename = "type")]
    pub kind: Option<NoticeKind>,
    pub priority: Option<NoticePriority>,
    pub pinned: Option<bool>,
    #[serde(default)]
    pub active_only: bool,
}
impl_page_request!(NoticeListQuery);
