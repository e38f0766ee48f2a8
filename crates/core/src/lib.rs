//! `campus-core` — shared domain primitives.
//!
//! Strongly-typed identifiers, the domain error model and pagination types
//! used by every other crate. This crate is intentionally free of HTTP,
//! storage and auth concerns.

pub mod error;
pub mod id;
pub mod page;

pub use error::{DomainError, DomainResult, FieldError};
pub use id::{
    AssignmentId, ClassSectionId, NoticeId, StudentProfileId, SubjectId, TeacherProfileId, UserId,
};
pub use page::{Page, PageMeta, PageRequest, SortOrder};
