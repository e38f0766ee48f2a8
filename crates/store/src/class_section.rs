//! Class sections — one class+section+academic-year combination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::{
    ClassSectionId, DomainError, DomainResult, FieldError, StudentProfileId, SubjectId,
    TeacherProfileId,
};

/// A subject taught in a class, optionally by a specific teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAssignment {
    pub subject_id: SubjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<TeacherProfileId>,
}

/// # Invariants
/// - `(name, section, academic_year)` is unique.
/// - `capacity >= 1`; enrollment never exceeds capacity.
/// - `class_teacher`, when set, resolves to an existing, active TeacherProfile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSection {
    pub id: ClassSectionId,
    pub name: String,
    pub section: String,
    pub academic_year: String,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_teacher: Option<TeacherProfileId>,
    pub is_active: bool,
    pub subjects: Vec<SubjectAssignment>,
    pub students: Vec<StudentProfileId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ClassSectionDraft {
    pub name: String,
    pub section: String,
    pub academic_year: String,
    pub capacity: u32,
    pub room: Option<String>,
    pub class_teacher: Option<TeacherProfileId>,
    pub subjects: Vec<SubjectAssignment>,
}

impl ClassSectionDraft {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "must not be empty"));
        }
        if self.section.trim().is_empty() {
            errors.push(FieldError::new("section", "must not be empty"));
        }
        if self.academic_year.trim().is_empty() {
            errors.push(FieldError::new("academicYear", "must not be empty"));
        }
        if self.capacity < 1 {
            errors.push(FieldError::new("capacity", "must be at least 1"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation_all(errors))
        }
    }

    pub(crate) fn into_class(self, id: ClassSectionId, now: DateTime<Utc>) -> ClassSection {
        ClassSection {
            id,
            name: self.name.trim().to_string(),
            section: self.section.trim().to_uppercase(),
            academic_year: self.academic_year.trim().to_string(),
            capacity: self.capacity,
            room: self.room,
            class_teacher: self.class_teacher,
            is_active: true,
            subjects: self.subjects,
            students: Vec::new(),
            created_at: now,
        }
    }
}

/// `class_teacher` uses a nested Option so a patch can clear it.
#[derive(Debug, Clone, Default)]
pub struct ClassSectionPatch {
    pub name: Option<String>,
    pub section: Option<String>,
    pub academic_year: Option<String>,
    pub capacity: Option<u32>,
    pub room: Option<String>,
    pub class_teacher: Option<Option<TeacherProfileId>>,
    pub is_active: Option<bool>,
    pub subjects: Option<Vec<SubjectAssignment>>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassSectionFilter {
    pub academic_year: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ClassSectionDraft {
        ClassSectionDraft {
            name: "Grade 8".into(),
            section: "b".into(),
            academic_year: "2025-2026".into(),
            capacity: 30,
            room: None,
            class_teacher: None,
            subjects: vec![],
        }
    }

    #[test]
    fn section_is_uppercased_and_class_starts_active_and_empty() {
        let class = draft().into_class(ClassSectionId::new(), Utc::now());
        assert_eq!(class.section, "B");
        assert!(class.is_active);
        assert!(class.students.is_empty());
    }

    #[test]
    fn zero_capacity_names_the_field() {
        let mut d = draft();
        d.capacity = 0;
        let err = d.validate().unwrap_err();
        assert!(err.field_errors().unwrap().iter().any(|f| f.field == "capacity"));
    }
}
