//! Subject catalog entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::{DomainError, DomainResult, FieldError, SubjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Core,
    Elective,
    Optional,
    Extracurricular,
}

/// # Invariants
/// - Code is unique, stored uppercase.
/// - `credits >= 1`, `passing_marks <= total_marks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
    pub department: String,
    #[serde(rename = "type")]
    pub kind: SubjectKind,
    pub credits: u32,
    pub total_marks: u32,
    pub passing_marks: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SubjectDraft {
    pub code: String,
    pub name: String,
    pub department: String,
    pub kind: SubjectKind,
    pub credits: u32,
    pub total_marks: u32,
    pub passing_marks: u32,
}

impl SubjectDraft {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.code.trim().is_empty() {
            errors.push(FieldError::new("code", "must not be empty"));
        }
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "must not be empty"));
        }
        if self.department.trim().is_empty() {
            errors.push(FieldError::new("department", "must not be empty"));
        }
        if self.credits < 1 {
            errors.push(FieldError::new("credits", "must be at least 1"));
        }
        if self.passing_marks > self.total_marks {
            errors.push(FieldError::new(
                "passingMarks",
                "must not exceed totalMarks",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation_all(errors))
        }
    }

    pub(crate) fn into_subject(self, id: SubjectId, now: DateTime<Utc>) -> Subject {
        Subject {
            id,
            code: self.code.trim().to_uppercase(),
            name: self.name.trim().to_string(),
            department: self.department.trim().to_string(),
            kind: self.kind,
            credits: self.credits,
            total_marks: self.total_marks,
            passing_marks: self.passing_marks,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub department: Option<String>,
    pub kind: Option<SubjectKind>,
    pub credits: Option<u32>,
    pub total_marks: Option<u32>,
    pub passing_marks: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectFilter {
    pub kind: Option<SubjectKind>,
    pub department: Option<String>,
}
