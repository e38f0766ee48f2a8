//! The `EntityStore` contract.
//!
//! One trait covering every entity's create/find/list/update/delete plus the
//! relationship operations (enrollment, submissions, grading). Handlers talk
//! to a trait object; tests and the shipped deployment use the in-memory
//! implementation, a durable engine would implement the same contract.

use chrono::{DateTime, Utc};

use campus_core::{
    AssignmentId, ClassSectionId, DomainResult, NoticeId, Page, PageRequest, StudentProfileId,
    SubjectId, TeacherProfileId, UserId,
};

use crate::assignment::{
    Assignment, AssignmentDraft, AssignmentFilter, AssignmentPatch, SubmissionDraft,
};
use crate::class_section::{ClassSection, ClassSectionDraft, ClassSectionFilter, ClassSectionPatch};
use crate::identity::{Identity, IdentityDraft, IdentityFilter, IdentityPatch};
use crate::notice::{Notice, NoticeDraft, NoticeFilter, NoticePatch};
use crate::profile::{
    StudentProfile, StudentProfileDraft, StudentProfileFilter, StudentProfilePatch, TeacherProfile,
    TeacherProfileDraft, TeacherProfileFilter, TeacherProfilePatch,
};
use crate::subject::{Subject, SubjectDraft, SubjectFilter, SubjectPatch};

/// Outcome of deleting an identity under the cascade-deactivate policy:
/// identities still referenced by profiles or authored content are
/// deactivated instead of removed.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityRemoval {
    Deleted,
    Deactivated(Identity),
}

pub trait EntityStore: Send + Sync {
    // ── Identities ──────────────────────────────────────────────────────────

    fn create_identity(&self, draft: IdentityDraft) -> DomainResult<Identity>;
    fn identity_by_id(&self, id: UserId) -> DomainResult<Option<Identity>>;
    /// Case-insensitive email lookup.
    fn identity_by_email(&self, email: &str) -> DomainResult<Option<Identity>>;
    fn list_identities(
        &self,
        filter: &IdentityFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<Identity>>;
    fn update_identity(&self, id: UserId, patch: IdentityPatch) -> DomainResult<Identity>;
    /// Stamp `last_login_at` after a successful credential check.
    fn record_login(&self, id: UserId, at: DateTime<Utc>) -> DomainResult<Identity>;
    fn delete_identity(&self, id: UserId) -> DomainResult<IdentityRemoval>;

    // ── Student profiles ────────────────────────────────────────────────────

    fn create_student_profile(&self, draft: StudentProfileDraft) -> DomainResult<StudentProfile>;
    fn student_profile_by_id(&self, id: StudentProfileId) -> DomainResult<Option<StudentProfile>>;
    fn student_profile_by_user(&self, user_id: UserId) -> DomainResult<Option<StudentProfile>>;
    fn list_student_profiles(
        &self,
        filter: &StudentProfileFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<StudentProfile>>;
    fn update_student_profile(
        &self,
        id: StudentProfileId,
        patch: StudentProfilePatch,
    ) -> DomainResult<StudentProfile>;
    fn delete_student_profile(&self, id: StudentProfileId) -> DomainResult<()>;

    // ── Teacher profiles ────────────────────────────────────────────────────

    fn create_teacher_profile(&self, draft: TeacherProfileDraft) -> DomainResult<TeacherProfile>;
    fn teacher_profile_by_id(&self, id: TeacherProfileId) -> DomainResult<Option<TeacherProfile>>;
    fn teacher_profile_by_user(&self, user_id: UserId) -> DomainResult<Option<TeacherProfile>>;
    fn list_teacher_profiles(
        &self,
        filter: &TeacherProfileFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<TeacherProfile>>;
    fn update_teacher_profile(
        &self,
        id: TeacherProfileId,
        patch: TeacherProfilePatch,
    ) -> DomainResult<TeacherProfile>;
    fn delete_teacher_profile(&self, id: TeacherProfileId) -> DomainResult<()>;

    // ── Class sections ──────────────────────────────────────────────────────

    fn create_class(&self, draft: ClassSectionDraft) -> DomainResult<ClassSection>;
    fn class_by_id(&self, id: ClassSectionId) -> DomainResult<Option<ClassSection>>;
    fn list_classes(
        &self,
        filter: &ClassSectionFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<ClassSection>>;
    fn update_class(&self, id: ClassSectionId, patch: ClassSectionPatch)
    -> DomainResult<ClassSection>;
    fn delete_class(&self, id: ClassSectionId) -> DomainResult<()>;
    fn enroll_student(
        &self,
        class_id: ClassSectionId,
        student_id: StudentProfileId,
    ) -> DomainResult<ClassSection>;
    fn unenroll_student(
        &self,
        class_id: ClassSectionId,
        student_id: StudentProfileId,
    ) -> DomainResult<ClassSection>;

    // ── Subjects ────────────────────────────────────────────────────────────

    fn create_subject(&self, draft: SubjectDraft) -> DomainResult<Subject>;
    fn subject_by_id(&self, id: SubjectId) -> DomainResult<Option<Subject>>;
    fn subject_by_code(&self, code: &str) -> DomainResult<Option<Subject>>;
    fn list_subjects(
        &self,
        filter: &SubjectFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<Subject>>;
    fn update_subject(&self, id: SubjectId, patch: SubjectPatch) -> DomainResult<Subject>;
    fn delete_subject(&self, id: SubjectId) -> DomainResult<()>;

    // ── Assignments ─────────────────────────────────────────────────────────

    fn create_assignment(&self, draft: AssignmentDraft) -> DomainResult<Assignment>;
    fn assignment_by_id(&self, id: AssignmentId) -> DomainResult<Option<Assignment>>;
    fn list_assignments(
        &self,
        filter: &AssignmentFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<Assignment>>;
    fn update_assignment(&self, id: AssignmentId, patch: AssignmentPatch)
    -> DomainResult<Assignment>;
    fn delete_assignment(&self, id: AssignmentId) -> DomainResult<()>;
    /// Record a student's submission. A second live submission from the same
    /// student conflicts; a `Resubmit` status may be replaced.
    fn submit_assignment(
        &self,
        id: AssignmentId,
        draft: SubmissionDraft,
    ) -> DomainResult<Assignment>;
    fn grade_submission(
        &self,
        id: AssignmentId,
        student_id: StudentProfileId,
        grade: u32,
        feedback: Option<String>,
    ) -> DomainResult<Assignment>;

    // ── Notices ─────────────────────────────────────────────────────────────

    fn create_notice(&self, draft: NoticeDraft) -> DomainResult<Notice>;
    fn notice_by_id(&self, id: NoticeId) -> DomainResult<Option<Notice>>;
    fn list_notices(&self, filter: &NoticeFilter, page: &PageRequest) -> DomainResult<Page<Notice>>;
    fn update_notice(&self, id: NoticeId, patch: NoticePatch) -> DomainResult<Notice>;
    fn delete_notice(&self, id: NoticeId) -> DomainResult<()>;
}
