//! Role profiles — role-specific extensions of an Identity.
//!
//! Exactly one profile per identity of the matching role. The identity owns
//! authentication; the profile carries the student/teacher attributes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use campus_core::{
    ClassSectionId, DomainError, DomainResult, FieldError, StudentProfileId, SubjectId,
    TeacherProfileId, UserId,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: StudentProfileId,
    pub user_id: UserId,
    /// Unique across all student profiles, stored uppercase.
    pub student_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassSectionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StudentProfileDraft {
    pub user_id: UserId,
    pub student_code: String,
    pub class_id: Option<ClassSectionId>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub parent_email: Option<String>,
}

impl StudentProfileDraft {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.student_code.trim().is_empty() {
            errors.push(FieldError::new("studentCode", "must not be empty"));
        }
        if let Some(email) = &self.parent_email {
            if !email.trim().is_empty() && !email.contains('@') {
                errors.push(FieldError::new("parentEmail", "must be a valid email address"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation_all(errors))
        }
    }

    pub(crate) fn into_profile(self, id: StudentProfileId, now: DateTime<Utc>) -> StudentProfile {
        StudentProfile {
            id,
            user_id: self.user_id,
            student_code: self.student_code.trim().to_uppercase(),
            class_id: self.class_id,
            parent_name: self.parent_name,
            parent_phone: self.parent_phone,
            parent_email: self.parent_email,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentProfilePatch {
    pub class_id: Option<Option<ClassSectionId>>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub parent_email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StudentProfileFilter {
    pub class_id: Option<ClassSectionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    pub id: TeacherProfileId,
    pub user_id: UserId,
    /// Unique across all teacher profiles, stored uppercase.
    pub employee_code: String,
    pub department: String,
    pub designation: String,
    pub subject_ids: Vec<SubjectId>,
    /// At most one class per teacher may carry this flag.
    pub is_class_teacher: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassSectionId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TeacherProfileDraft {
    pub user_id: UserId,
    pub employee_code: String,
    pub department: String,
    pub designation: String,
    pub subject_ids: Vec<SubjectId>,
    pub is_class_teacher: bool,
    pub class_id: Option<ClassSectionId>,
}

impl TeacherProfileDraft {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.employee_code.trim().is_empty() {
            errors.push(FieldError::new("employeeCode", "must not be empty"));
        }
        if self.department.trim().is_empty() {
            errors.push(FieldError::new("department", "must not be empty"));
        }
        if self.designation.trim().is_empty() {
            errors.push(FieldError::new("designation", "must not be empty"));
        }
        if self.is_class_teacher && self.class_id.is_none() {
            errors.push(FieldError::new(
                "classId",
                "required when isClassTeacher is set",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation_all(errors))
        }
    }

    pub(crate) fn into_profile(self, id: TeacherProfileId, now: DateTime<Utc>) -> TeacherProfile {
        TeacherProfile {
            id,
            user_id: self.user_id,
            employee_code: self.employee_code.trim().to_uppercase(),
            department: self.department.trim().to_string(),
            designation: self.designation.trim().to_string(),
            subject_ids: self.subject_ids,
            is_class_teacher: self.is_class_teacher,
            class_id: self.class_id,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeacherProfilePatch {
    pub department: Option<String>,
    pub designation: Option<String>,
    pub subject_ids: Option<Vec<SubjectId>>,
    pub is_class_teacher: Option<bool>,
    pub class_id: Option<Option<ClassSectionId>>,
}

#[derive(Debug, Clone, Default)]
pub struct TeacherProfileFilter {
    pub department: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_code_is_uppercased() {
        let draft = StudentProfileDraft {
            user_id: UserId::new(),
            student_code: " stu-001 ".into(),
            class_id: None,
            parent_name: None,
            parent_phone: None,
            parent_email: None,
        };
        let profile = draft.into_profile(StudentProfileId::new(), Utc::now());
        assert_eq!(profile.student_code, "STU-001");
    }

    #[test]
    fn class_teacher_flag_requires_a_class() {
        let draft = TeacherProfileDraft {
            user_id: UserId::new(),
            employee_code: "EMP-1".into(),
            department: "Science".into(),
            designation: "Lecturer".into(),
            subject_ids: vec![],
            is_class_teacher: true,
            class_id: None,
        };
        let err = draft.validate().unwrap_err();
        assert!(err.field_errors().unwrap().iter().any(|f| f.field == "classId"));
    }
}
