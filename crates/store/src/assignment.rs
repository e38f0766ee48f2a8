//! Assignments and per-student submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::{
    AssignmentId, ClassSectionId, DomainError, DomainResult, FieldError, StudentProfileId,
    SubjectId, TeacherProfileId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
    Returned,
    Resubmit,
}

/// One student's submission for an assignment.
///
/// At most one live submission per student per assignment; a `Resubmit`
/// status is the one state a new submission may replace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub student_id: StudentProfileId,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub status: SubmissionStatus,
}

/// # Invariants
/// - Belongs to exactly one class, one subject, one authoring teacher.
/// - A grade, when present, is within `[0, total_marks]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub class_id: ClassSectionId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherProfileId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub total_marks: u32,
    pub submissions: Vec<Submission>,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub fn submission_for(&self, student_id: StudentProfileId) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.student_id == student_id)
    }
}

#[derive(Debug, Clone)]
pub struct AssignmentDraft {
    pub class_id: ClassSectionId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherProfileId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub total_marks: u32,
}

impl AssignmentDraft {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "must not be empty"));
        }
        if self.total_marks < 1 {
            errors.push(FieldError::new("totalMarks", "must be at least 1"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation_all(errors))
        }
    }

    pub(crate) fn into_assignment(self, id: AssignmentId, now: DateTime<Utc>) -> Assignment {
        Assignment {
            id,
            class_id: self.class_id,
            subject_id: self.subject_id,
            teacher_id: self.teacher_id,
            title: self.title.trim().to_string(),
            description: self.description,
            due_date: self.due_date,
            total_marks: self.total_marks,
            submissions: Vec::new(),
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub total_marks: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub class_id: Option<ClassSectionId>,
    pub subject_id: Option<SubjectId>,
    pub teacher_id: Option<TeacherProfileId>,
}

/// Input for a student submission.
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub student_id: StudentProfileId,
    pub content: String,
}

impl SubmissionDraft {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.content.trim().is_empty() {
            return Err(DomainError::validation("content", "must not be empty"));
        }
        Ok(())
    }
}
