//! `campus-store` — the relational entity store.
//!
//! Typed entities with their invariants, the `EntityStore` contract and the
//! in-memory implementation. Every write passes entity-specific invariant
//! checks before commit; violations surface as structured `DomainError`s
//! naming the offending field(s), never a raw storage failure.

pub mod assignment;
pub mod class_section;
pub mod identity;
pub mod memory;
pub mod notice;
pub mod profile;
pub mod store;
pub mod subject;

pub use assignment::{
    Assignment, AssignmentDraft, AssignmentFilter, AssignmentPatch, Submission, SubmissionDraft,
    SubmissionStatus,
};
pub use class_section::{
    ClassSection, ClassSectionDraft, ClassSectionFilter, ClassSectionPatch, SubjectAssignment,
};
pub use identity::{Gender, Identity, IdentityDraft, IdentityFilter, IdentityPatch};
pub use memory::MemoryStore;
pub use notice::{Audience, Notice, NoticeDraft, NoticeFilter, NoticeKind, NoticePatch, NoticePriority};
pub use profile::{
    StudentProfile, StudentProfileDraft, StudentProfileFilter, StudentProfilePatch, TeacherProfile,
    TeacherProfileDraft, TeacherProfileFilter, TeacherProfilePatch,
};
pub use store::{EntityStore, IdentityRemoval};
pub use subject::{Subject, SubjectDraft, SubjectFilter, SubjectKind, SubjectPatch};
