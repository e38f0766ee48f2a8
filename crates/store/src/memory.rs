//! In-memory `EntityStore` implementation.
//!
//! One `RwLock` over the whole world: every write takes the write guard, so
//! uniqueness check-and-insert is serialized and two racing creates with the
//! same unique key can never both succeed. Intended for tests and small
//! deployments; not optimized for large data sets.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use campus_auth::Role;
use campus_core::{
    AssignmentId, ClassSectionId, DomainError, DomainResult, NoticeId, Page, PageRequest,
    SortOrder, StudentProfileId, SubjectId, TeacherProfileId, UserId,
};

use crate::assignment::{
    Assignment, AssignmentDraft, AssignmentFilter, AssignmentPatch, Submission, SubmissionDraft,
    SubmissionStatus,
};
use crate::class_section::{ClassSection, ClassSectionDraft, ClassSectionFilter, ClassSectionPatch};
use crate::identity::{Identity, IdentityDraft, IdentityFilter, IdentityPatch};
use crate::notice::{Notice, NoticeDraft, NoticeFilter, NoticePatch};
use crate::profile::{
    StudentProfile, StudentProfileDraft, StudentProfileFilter, StudentProfilePatch, TeacherProfile,
    TeacherProfileDraft, TeacherProfileFilter, TeacherProfilePatch,
};
use crate::store::{EntityStore, IdentityRemoval};
use crate::subject::{Subject, SubjectDraft, SubjectFilter, SubjectPatch};

#[derive(Debug, Default)]
struct World {
    identities: HashMap<UserId, Identity>,
    students: HashMap<StudentProfileId, StudentProfile>,
    teachers: HashMap<TeacherProfileId, TeacherProfile>,
    classes: HashMap<ClassSectionId, ClassSection>,
    subjects: HashMap<SubjectId, Subject>,
    assignments: HashMap<AssignmentId, Assignment>,
    notices: HashMap<NoticeId, Notice>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    world: RwLock<World>,
}

fn lock_poisoned() -> DomainError {
    DomainError::internal("store lock poisoned")
}

/// Case-insensitive substring match over a declared field subset.
fn matches_search(search: &Option<String>, haystacks: &[&str]) -> bool {
    match search {
        None => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
        }
    }
}

/// Sort (default: creation time), apply direction, then slice one page.
fn finish<T>(
    mut items: Vec<T>,
    page: &PageRequest,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Page<T> {
    items.sort_by(|a, b| cmp(a, b));
    if page.sort_order == SortOrder::Desc {
        items.reverse();
    }
    Page::slice(items, page)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a first admin identity so a fresh deployment is loginable.
    /// No-op when any identity already exists.
    pub fn seed_admin(&self, email: &str, password_hash: &str, name: &str) -> DomainResult<bool> {
        {
            let world = self.world.read().map_err(|_| lock_poisoned())?;
            if !world.identities.is_empty() {
                return Ok(false);
            }
        }
        self.create_identity(IdentityDraft {
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            role: Role::Admin,
            phone: None,
            address: None,
            date_of_birth: None,
            gender: None,
        })?;
        Ok(true)
    }

    fn check_class_teacher(world: &World, teacher_id: TeacherProfileId) -> DomainResult<()> {
        let Some(profile) = world.teachers.get(&teacher_id) else {
            return Err(DomainError::validation(
                "classTeacher",
                "must reference an existing teacher profile",
            ));
        };
        let active = world
            .identities
            .get(&profile.user_id)
            .is_some_and(|i| i.is_active);
        if !active {
            return Err(DomainError::validation(
                "classTeacher",
                "must reference an active teacher",
            ));
        }
        Ok(())
    }

    fn check_subject_assignments(
        world: &World,
        subjects: &[crate::class_section::SubjectAssignment],
    ) -> DomainResult<()> {
        for entry in subjects {
            if !world.subjects.contains_key(&entry.subject_id) {
                return Err(DomainError::validation(
                    "subjects",
                    "must reference existing subjects",
                ));
            }
            if let Some(teacher_id) = entry.teacher_id {
                if !world.teachers.contains_key(&teacher_id) {
                    return Err(DomainError::validation(
                        "subjects",
                        "must reference existing teachers",
                    ));
                }
            }
        }
        Ok(())
    }

    fn class_key_taken(
        world: &World,
        name: &str,
        section: &str,
        academic_year: &str,
        exclude: Option<ClassSectionId>,
    ) -> bool {
        world.classes.values().any(|c| {
            Some(c.id) != exclude
                && c.name.eq_ignore_ascii_case(name)
                && c.section.eq_ignore_ascii_case(section)
                && c.academic_year == academic_year
        })
    }
}

impl EntityStore for MemoryStore {
    // ── Identities ──────────────────────────────────────────────────────────

    fn create_identity(&self, draft: IdentityDraft) -> DomainResult<Identity> {
        draft.validate()?;
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;

        let email = draft.email.trim().to_lowercase();
        if world.identities.values().any(|i| i.email == email) {
            return Err(DomainError::conflict("email", "email is already registered"));
        }

        let identity = draft.into_identity(UserId::new(), Utc::now());
        world.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    fn identity_by_id(&self, id: UserId) -> DomainResult<Option<Identity>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        Ok(world.identities.get(&id).cloned())
    }

    fn identity_by_email(&self, email: &str) -> DomainResult<Option<Identity>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        let email = email.trim().to_lowercase();
        Ok(world.identities.values().find(|i| i.email == email).cloned())
    }

    fn list_identities(
        &self,
        filter: &IdentityFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<Identity>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        let items: Vec<Identity> = world
            .identities
            .values()
            .filter(|i| filter.role.is_none_or(|r| i.role == r))
            .filter(|i| filter.is_active.is_none_or(|a| i.is_active == a))
            .filter(|i| matches_search(&page.search, &[&i.name, &i.email]))
            .cloned()
            .collect();

        let sort_by = page.sort_by.as_deref();
        Ok(finish(items, page, move |a, b| match sort_by {
            Some("name") => a.name.cmp(&b.name),
            Some("email") => a.email.cmp(&b.email),
            _ => a.created_at.cmp(&b.created_at),
        }))
    }

    fn update_identity(&self, id: UserId, patch: IdentityPatch) -> DomainResult<Identity> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.identities.contains_key(&id) {
            return Err(DomainError::NotFound);
        }

        if let Some(new_role) = patch.role {
            let has_student = world.students.values().any(|p| p.user_id == id);
            let has_teacher = world.teachers.values().any(|p| p.user_id == id);
            if (has_student && new_role != Role::Student)
                || (has_teacher && new_role != Role::Teacher)
            {
                return Err(DomainError::conflict(
                    "role",
                    "a role profile exists for this identity",
                ));
            }
        }

        let identity = world
            .identities
            .get_mut(&id)
            .ok_or(DomainError::NotFound)?;
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name", "must not be empty"));
            }
            identity.name = name.trim().to_string();
        }
        if let Some(role) = patch.role {
            identity.role = role;
        }
        if let Some(active) = patch.is_active {
            identity.is_active = active;
        }
        if let Some(phone) = patch.phone {
            identity.phone = Some(phone);
        }
        if let Some(address) = patch.address {
            identity.address = Some(address);
        }
        if let Some(dob) = patch.date_of_birth {
            identity.date_of_birth = Some(dob);
        }
        if let Some(gender) = patch.gender {
            identity.gender = Some(gender);
        }
        if let Some(hash) = patch.password_hash {
            identity.password_hash = hash;
        }
        Ok(identity.clone())
    }

    fn record_login(&self, id: UserId, at: DateTime<Utc>) -> DomainResult<Identity> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        let identity = world
            .identities
            .get_mut(&id)
            .ok_or(DomainError::NotFound)?;
        identity.last_login_at = Some(at);
        Ok(identity.clone())
    }

    fn delete_identity(&self, id: UserId) -> DomainResult<IdentityRemoval> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.identities.contains_key(&id) {
            return Err(DomainError::NotFound);
        }

        let referenced = world.students.values().any(|p| p.user_id == id)
            || world.teachers.values().any(|p| p.user_id == id)
            || world.notices.values().any(|n| n.author_id == id);

        if referenced {
            let identity = world
                .identities
                .get_mut(&id)
                .ok_or(DomainError::NotFound)?;
            identity.is_active = false;
            tracing::info!(identity = %id, "identity has dependents; deactivated instead of deleted");
            Ok(IdentityRemoval::Deactivated(identity.clone()))
        } else {
            world.identities.remove(&id);
            Ok(IdentityRemoval::Deleted)
        }
    }

    // ── Student profiles ────────────────────────────────────────────────────

    fn create_student_profile(&self, draft: StudentProfileDraft) -> DomainResult<StudentProfile> {
        draft.validate()?;
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;

        let Some(identity) = world.identities.get(&draft.user_id) else {
            return Err(DomainError::validation(
                "userId",
                "must reference an existing identity",
            ));
        };
        if identity.role != Role::Student {
            return Err(DomainError::validation(
                "userId",
                "identity role must be student",
            ));
        }
        if world.students.values().any(|p| p.user_id == draft.user_id) {
            return Err(DomainError::conflict(
                "userId",
                "a student profile already exists for this identity",
            ));
        }
        let code = draft.student_code.trim().to_uppercase();
        if world.students.values().any(|p| p.student_code == code) {
            return Err(DomainError::conflict(
                "studentCode",
                "student code is already taken",
            ));
        }
        if let Some(class_id) = draft.class_id {
            let Some(class) = world.classes.get(&class_id) else {
                return Err(DomainError::validation(
                    "classId",
                    "must reference an existing class",
                ));
            };
            if class.students.len() >= class.capacity as usize {
                return Err(DomainError::conflict("capacity", "class is at capacity"));
            }
        }

        let profile = draft.into_profile(StudentProfileId::new(), Utc::now());
        if let Some(class_id) = profile.class_id {
            if let Some(class) = world.classes.get_mut(&class_id) {
                class.students.push(profile.id);
            }
        }
        world.students.insert(profile.id, profile.clone());
        Ok(profile)
    }

    fn student_profile_by_id(&self, id: StudentProfileId) -> DomainResult<Option<StudentProfile>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        Ok(world.students.get(&id).cloned())
    }

    fn student_profile_by_user(&self, user_id: UserId) -> DomainResult<Option<StudentProfile>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        Ok(world
            .students
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    fn list_student_profiles(
        &self,
        filter: &StudentProfileFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<StudentProfile>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        let items: Vec<StudentProfile> = world
            .students
            .values()
            .filter(|p| filter.class_id.is_none_or(|c| p.class_id == Some(c)))
            .filter(|p| {
                matches_search(
                    &page.search,
                    &[
                        &p.student_code,
                        p.parent_name.as_deref().unwrap_or_default(),
                    ],
                )
            })
            .cloned()
            .collect();

        let sort_by = page.sort_by.as_deref();
        Ok(finish(items, page, move |a, b| match sort_by {
            Some("studentCode") => a.student_code.cmp(&b.student_code),
            _ => a.created_at.cmp(&b.created_at),
        }))
    }

    fn update_student_profile(
        &self,
        id: StudentProfileId,
        patch: StudentProfilePatch,
    ) -> DomainResult<StudentProfile> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.students.contains_key(&id) {
            return Err(DomainError::NotFound);
        }
        if let Some(Some(class_id)) = patch.class_id {
            let Some(class) = world.classes.get(&class_id) else {
                return Err(DomainError::validation(
                    "classId",
                    "must reference an existing class",
                ));
            };
            if !class.students.contains(&id) && class.students.len() >= class.capacity as usize {
                return Err(DomainError::conflict("capacity", "class is at capacity"));
            }
        }

        if let Some(email) = &patch.parent_email {
            if !email.contains('@') {
                return Err(DomainError::validation(
                    "parentEmail",
                    "must be a valid email address",
                ));
            }
        }

        // Rosters mirror `class_id`: leave every other class, join the target.
        if let Some(target) = patch.class_id {
            for class in world.classes.values_mut() {
                if Some(class.id) != target {
                    class.students.retain(|s| *s != id);
                }
            }
            if let Some(class_id) = target {
                if let Some(class) = world.classes.get_mut(&class_id) {
                    if !class.students.contains(&id) {
                        class.students.push(id);
                    }
                }
            }
        }

        let profile = world.students.get_mut(&id).ok_or(DomainError::NotFound)?;
        if let Some(class_id) = patch.class_id {
            profile.class_id = class_id;
        }
        if let Some(name) = patch.parent_name {
            profile.parent_name = Some(name);
        }
        if let Some(phone) = patch.parent_phone {
            profile.parent_phone = Some(phone);
        }
        if let Some(email) = patch.parent_email {
            profile.parent_email = Some(email);
        }
        Ok(profile.clone())
    }

    fn delete_student_profile(&self, id: StudentProfileId) -> DomainResult<()> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.students.contains_key(&id) {
            return Err(DomainError::NotFound);
        }
        if world.classes.values().any(|c| c.students.contains(&id)) {
            return Err(DomainError::conflict(
                "classId",
                "student is enrolled in a class",
            ));
        }
        if world
            .assignments
            .values()
            .any(|a| a.submissions.iter().any(|s| s.student_id == id))
        {
            return Err(DomainError::conflict(
                "submissions",
                "student has assignment submissions",
            ));
        }
        world.students.remove(&id);
        Ok(())
    }

    // ── Teacher profiles ────────────────────────────────────────────────────

    fn create_teacher_profile(&self, draft: TeacherProfileDraft) -> DomainResult<TeacherProfile> {
        draft.validate()?;
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;

        let Some(identity) = world.identities.get(&draft.user_id) else {
            return Err(DomainError::validation(
                "userId",
                "must reference an existing identity",
            ));
        };
        if identity.role != Role::Teacher {
            return Err(DomainError::validation(
                "userId",
                "identity role must be teacher",
            ));
        }
        if world.teachers.values().any(|p| p.user_id == draft.user_id) {
            return Err(DomainError::conflict(
                "userId",
                "a teacher profile already exists for this identity",
            ));
        }
        let code = draft.employee_code.trim().to_uppercase();
        if world.teachers.values().any(|p| p.employee_code == code) {
            return Err(DomainError::conflict(
                "employeeCode",
                "employee code is already taken",
            ));
        }
        for subject_id in &draft.subject_ids {
            if !world.subjects.contains_key(subject_id) {
                return Err(DomainError::validation(
                    "subjectIds",
                    "must reference existing subjects",
                ));
            }
        }
        if let Some(class_id) = draft.class_id {
            if !world.classes.contains_key(&class_id) {
                return Err(DomainError::validation(
                    "classId",
                    "must reference an existing class",
                ));
            }
        }

        let profile = draft.into_profile(TeacherProfileId::new(), Utc::now());
        world.teachers.insert(profile.id, profile.clone());
        Ok(profile)
    }

    fn teacher_profile_by_id(&self, id: TeacherProfileId) -> DomainResult<Option<TeacherProfile>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        Ok(world.teachers.get(&id).cloned())
    }

    fn teacher_profile_by_user(&self, user_id: UserId) -> DomainResult<Option<TeacherProfile>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        Ok(world
            .teachers
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    fn list_teacher_profiles(
        &self,
        filter: &TeacherProfileFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<TeacherProfile>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        let items: Vec<TeacherProfile> = world
            .teachers
            .values()
            .filter(|p| {
                filter
                    .department
                    .as_deref()
                    .is_none_or(|d| p.department.eq_ignore_ascii_case(d))
            })
            .filter(|p| {
                matches_search(
                    &page.search,
                    &[&p.employee_code, &p.department, &p.designation],
                )
            })
            .cloned()
            .collect();

        let sort_by = page.sort_by.as_deref();
        Ok(finish(items, page, move |a, b| match sort_by {
            Some("employeeCode") => a.employee_code.cmp(&b.employee_code),
            Some("department") => a.department.cmp(&b.department),
            _ => a.created_at.cmp(&b.created_at),
        }))
    }

    fn update_teacher_profile(
        &self,
        id: TeacherProfileId,
        patch: TeacherProfilePatch,
    ) -> DomainResult<TeacherProfile> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.teachers.contains_key(&id) {
            return Err(DomainError::NotFound);
        }
        if let Some(subject_ids) = &patch.subject_ids {
            for subject_id in subject_ids {
                if !world.subjects.contains_key(subject_id) {
                    return Err(DomainError::validation(
                        "subjectIds",
                        "must reference existing subjects",
                    ));
                }
            }
        }
        if let Some(Some(class_id)) = patch.class_id {
            if !world.classes.contains_key(&class_id) {
                return Err(DomainError::validation(
                    "classId",
                    "must reference an existing class",
                ));
            }
        }

        let current = world.teachers.get(&id).ok_or(DomainError::NotFound)?;
        if let Some(department) = &patch.department {
            if department.trim().is_empty() {
                return Err(DomainError::validation("department", "must not be empty"));
            }
        }
        let is_class_teacher = patch.is_class_teacher.unwrap_or(current.is_class_teacher);
        let class_id = patch.class_id.unwrap_or(current.class_id);
        if is_class_teacher && class_id.is_none() {
            return Err(DomainError::validation(
                "classId",
                "required when isClassTeacher is set",
            ));
        }

        let profile = world.teachers.get_mut(&id).ok_or(DomainError::NotFound)?;
        if let Some(department) = patch.department {
            profile.department = department.trim().to_string();
        }
        if let Some(designation) = patch.designation {
            profile.designation = designation.trim().to_string();
        }
        if let Some(subject_ids) = patch.subject_ids {
            profile.subject_ids = subject_ids;
        }
        profile.is_class_teacher = is_class_teacher;
        profile.class_id = class_id;
        Ok(profile.clone())
    }

    fn delete_teacher_profile(&self, id: TeacherProfileId) -> DomainResult<()> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.teachers.contains_key(&id) {
            return Err(DomainError::NotFound);
        }
        if world.assignments.values().any(|a| a.teacher_id == id) {
            return Err(DomainError::conflict(
                "assignments",
                "teacher has authored assignments",
            ));
        }
        if world.classes.values().any(|c| {
            c.class_teacher == Some(id)
                || c.subjects.iter().any(|s| s.teacher_id == Some(id))
        }) {
            return Err(DomainError::conflict(
                "classes",
                "teacher is referenced by a class",
            ));
        }
        world.teachers.remove(&id);
        Ok(())
    }

    // ── Class sections ──────────────────────────────────────────────────────

    fn create_class(&self, draft: ClassSectionDraft) -> DomainResult<ClassSection> {
        draft.validate()?;
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;

        if Self::class_key_taken(
            &world,
            draft.name.trim(),
            draft.section.trim(),
            draft.academic_year.trim(),
            None,
        ) {
            return Err(DomainError::conflict(
                "name",
                "a class with this name, section and academic year already exists",
            ));
        }
        if let Some(teacher_id) = draft.class_teacher {
            Self::check_class_teacher(&world, teacher_id)?;
        }
        Self::check_subject_assignments(&world, &draft.subjects)?;

        let class = draft.into_class(ClassSectionId::new(), Utc::now());
        world.classes.insert(class.id, class.clone());
        Ok(class)
    }

    fn class_by_id(&self, id: ClassSectionId) -> DomainResult<Option<ClassSection>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        Ok(world.classes.get(&id).cloned())
    }

    fn list_classes(
        &self,
        filter: &ClassSectionFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<ClassSection>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        let items: Vec<ClassSection> = world
            .classes
            .values()
            .filter(|c| {
                filter
                    .academic_year
                    .as_deref()
                    .is_none_or(|y| c.academic_year == y)
            })
            .filter(|c| filter.is_active.is_none_or(|a| c.is_active == a))
            .filter(|c| {
                matches_search(&page.search, &[&c.name, &c.section, &c.academic_year])
            })
            .cloned()
            .collect();

        let sort_by = page.sort_by.as_deref();
        Ok(finish(items, page, move |a, b| match sort_by {
            Some("name") => a.name.cmp(&b.name),
            Some("academicYear") => a.academic_year.cmp(&b.academic_year),
            _ => a.created_at.cmp(&b.created_at),
        }))
    }

    fn update_class(
        &self,
        id: ClassSectionId,
        patch: ClassSectionPatch,
    ) -> DomainResult<ClassSection> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        let Some(current) = world.classes.get(&id).cloned() else {
            return Err(DomainError::NotFound);
        };

        let name = patch.name.as_deref().unwrap_or(&current.name).trim().to_string();
        let section = patch
            .section
            .as_deref()
            .unwrap_or(&current.section)
            .trim()
            .to_uppercase();
        let academic_year = patch
            .academic_year
            .as_deref()
            .unwrap_or(&current.academic_year)
            .trim()
            .to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "must not be empty"));
        }
        if Self::class_key_taken(&world, &name, &section, &academic_year, Some(id)) {
            return Err(DomainError::conflict(
                "name",
                "a class with this name, section and academic year already exists",
            ));
        }

        let capacity = patch.capacity.unwrap_or(current.capacity);
        if capacity < 1 {
            return Err(DomainError::validation("capacity", "must be at least 1"));
        }
        if (capacity as usize) < current.students.len() {
            return Err(DomainError::validation(
                "capacity",
                "must not be below current enrollment",
            ));
        }

        let class_teacher = patch.class_teacher.unwrap_or(current.class_teacher);
        if let Some(teacher_id) = class_teacher {
            Self::check_class_teacher(&world, teacher_id)?;
        }
        if let Some(subjects) = &patch.subjects {
            Self::check_subject_assignments(&world, subjects)?;
        }

        let class = world.classes.get_mut(&id).ok_or(DomainError::NotFound)?;
        class.name = name;
        class.section = section;
        class.academic_year = academic_year;
        class.capacity = capacity;
        class.class_teacher = class_teacher;
        if let Some(room) = patch.room {
            class.room = Some(room);
        }
        if let Some(active) = patch.is_active {
            class.is_active = active;
        }
        if let Some(subjects) = patch.subjects {
            class.subjects = subjects;
        }
        Ok(class.clone())
    }

    fn delete_class(&self, id: ClassSectionId) -> DomainResult<()> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.classes.contains_key(&id) {
            return Err(DomainError::NotFound);
        }
        let class = &world.classes[&id];
        if !class.students.is_empty() {
            return Err(DomainError::conflict(
                "students",
                "class has enrolled students",
            ));
        }
        if world.assignments.values().any(|a| a.class_id == id) {
            return Err(DomainError::conflict(
                "assignments",
                "class has assignments",
            ));
        }
        if world.teachers.values().any(|t| t.class_id == Some(id)) {
            return Err(DomainError::conflict(
                "classTeacher",
                "a teacher profile heads this class",
            ));
        }
        world.classes.remove(&id);
        Ok(())
    }

    fn enroll_student(
        &self,
        class_id: ClassSectionId,
        student_id: StudentProfileId,
    ) -> DomainResult<ClassSection> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        let Some(class) = world.classes.get(&class_id) else {
            return Err(DomainError::NotFound);
        };
        if !class.is_active {
            return Err(DomainError::validation("classId", "class is not active"));
        }
        if !world.students.contains_key(&student_id) {
            return Err(DomainError::validation(
                "studentId",
                "must reference an existing student profile",
            ));
        }
        if class.students.contains(&student_id) {
            return Err(DomainError::conflict(
                "studentId",
                "student is already enrolled",
            ));
        }
        if class.students.len() >= class.capacity as usize {
            return Err(DomainError::conflict("capacity", "class is at capacity"));
        }

        let class = world
            .classes
            .get_mut(&class_id)
            .ok_or(DomainError::NotFound)?;
        class.students.push(student_id);
        let snapshot = class.clone();
        if let Some(student) = world.students.get_mut(&student_id) {
            student.class_id = Some(class_id);
        }
        Ok(snapshot)
    }

    fn unenroll_student(
        &self,
        class_id: ClassSectionId,
        student_id: StudentProfileId,
    ) -> DomainResult<ClassSection> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        let Some(class) = world.classes.get_mut(&class_id) else {
            return Err(DomainError::NotFound);
        };
        let before = class.students.len();
        class.students.retain(|s| *s != student_id);
        if class.students.len() == before {
            return Err(DomainError::NotFound);
        }
        let snapshot = class.clone();
        if let Some(student) = world.students.get_mut(&student_id) {
            if student.class_id == Some(class_id) {
                student.class_id = None;
            }
        }
        Ok(snapshot)
    }

    // ── Subjects ────────────────────────────────────────────────────────────

    fn create_subject(&self, draft: SubjectDraft) -> DomainResult<Subject> {
        draft.validate()?;
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;

        let code = draft.code.trim().to_uppercase();
        if world.subjects.values().any(|s| s.code == code) {
            return Err(DomainError::conflict("code", "subject code already exists"));
        }

        let subject = draft.into_subject(SubjectId::new(), Utc::now());
        world.subjects.insert(subject.id, subject.clone());
        Ok(subject)
    }

    fn subject_by_id(&self, id: SubjectId) -> DomainResult<Option<Subject>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        Ok(world.subjects.get(&id).cloned())
    }

    fn subject_by_code(&self, code: &str) -> DomainResult<Option<Subject>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        let code = code.trim().to_uppercase();
        Ok(world.subjects.values().find(|s| s.code == code).cloned())
    }

    fn list_subjects(
        &self,
        filter: &SubjectFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<Subject>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        let items: Vec<Subject> = world
            .subjects
            .values()
            .filter(|s| filter.kind.is_none_or(|k| s.kind == k))
            .filter(|s| {
                filter
                    .department
                    .as_deref()
                    .is_none_or(|d| s.department.eq_ignore_ascii_case(d))
            })
            .filter(|s| matches_search(&page.search, &[&s.code, &s.name, &s.department]))
            .cloned()
            .collect();

        let sort_by = page.sort_by.as_deref();
        Ok(finish(items, page, move |a, b| match sort_by {
            Some("code") => a.code.cmp(&b.code),
            Some("name") => a.name.cmp(&b.name),
            _ => a.created_at.cmp(&b.created_at),
        }))
    }

    fn update_subject(&self, id: SubjectId, patch: SubjectPatch) -> DomainResult<Subject> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        let Some(current) = world.subjects.get(&id).cloned() else {
            return Err(DomainError::NotFound);
        };

        let credits = patch.credits.unwrap_or(current.credits);
        let total_marks = patch.total_marks.unwrap_or(current.total_marks);
        let passing_marks = patch.passing_marks.unwrap_or(current.passing_marks);
        if credits < 1 {
            return Err(DomainError::validation("credits", "must be at least 1"));
        }
        if passing_marks > total_marks {
            return Err(DomainError::validation(
                "passingMarks",
                "must not exceed totalMarks",
            ));
        }

        let subject = world.subjects.get_mut(&id).ok_or(DomainError::NotFound)?;
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name", "must not be empty"));
            }
            subject.name = name.trim().to_string();
        }
        if let Some(department) = patch.department {
            subject.department = department.trim().to_string();
        }
        if let Some(kind) = patch.kind {
            subject.kind = kind;
        }
        subject.credits = credits;
        subject.total_marks = total_marks;
        subject.passing_marks = passing_marks;
        Ok(subject.clone())
    }

    fn delete_subject(&self, id: SubjectId) -> DomainResult<()> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.subjects.contains_key(&id) {
            return Err(DomainError::NotFound);
        }
        if world.assignments.values().any(|a| a.subject_id == id) {
            return Err(DomainError::conflict(
                "assignments",
                "subject is referenced by assignments",
            ));
        }
        if world
            .classes
            .values()
            .any(|c| c.subjects.iter().any(|s| s.subject_id == id))
        {
            return Err(DomainError::conflict(
                "classes",
                "subject is taught in a class",
            ));
        }
        if world
            .teachers
            .values()
            .any(|t| t.subject_ids.contains(&id))
        {
            return Err(DomainError::conflict(
                "teachers",
                "subject is assigned to a teacher",
            ));
        }
        world.subjects.remove(&id);
        Ok(())
    }

    // ── Assignments ─────────────────────────────────────────────────────────

    fn create_assignment(&self, draft: AssignmentDraft) -> DomainResult<Assignment> {
        draft.validate()?;
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;

        if !world.classes.contains_key(&draft.class_id) {
            return Err(DomainError::validation(
                "classId",
                "must reference an existing class",
            ));
        }
        if !world.subjects.contains_key(&draft.subject_id) {
            return Err(DomainError::validation(
                "subjectId",
                "must reference an existing subject",
            ));
        }
        if !world.teachers.contains_key(&draft.teacher_id) {
            return Err(DomainError::validation(
                "teacherId",
                "must reference an existing teacher profile",
            ));
        }

        let assignment = draft.into_assignment(AssignmentId::new(), Utc::now());
        world.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    fn assignment_by_id(&self, id: AssignmentId) -> DomainResult<Option<Assignment>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        Ok(world.assignments.get(&id).cloned())
    }

    fn list_assignments(
        &self,
        filter: &AssignmentFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<Assignment>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        let items: Vec<Assignment> = world
            .assignments
            .values()
            .filter(|a| filter.class_id.is_none_or(|c| a.class_id == c))
            .filter(|a| filter.subject_id.is_none_or(|s| a.subject_id == s))
            .filter(|a| filter.teacher_id.is_none_or(|t| a.teacher_id == t))
            .filter(|a| {
                matches_search(
                    &page.search,
                    &[&a.title, a.description.as_deref().unwrap_or_default()],
                )
            })
            .cloned()
            .collect();

        let sort_by = page.sort_by.as_deref();
        Ok(finish(items, page, move |a, b| match sort_by {
            Some("dueDate") => a.due_date.cmp(&b.due_date),
            Some("title") => a.title.cmp(&b.title),
            _ => a.created_at.cmp(&b.created_at),
        }))
    }

    fn update_assignment(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
    ) -> DomainResult<Assignment> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        let assignment = world
            .assignments
            .get_mut(&id)
            .ok_or(DomainError::NotFound)?;

        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title", "must not be empty"));
            }
        }
        if let Some(total_marks) = patch.total_marks {
            if total_marks < 1 {
                return Err(DomainError::validation("totalMarks", "must be at least 1"));
            }
            let max_grade = assignment
                .submissions
                .iter()
                .filter_map(|s| s.grade)
                .max()
                .unwrap_or(0);
            if total_marks < max_grade {
                return Err(DomainError::validation(
                    "totalMarks",
                    "must not be below an already awarded grade",
                ));
            }
            assignment.total_marks = total_marks;
        }
        if let Some(title) = patch.title {
            assignment.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            assignment.description = Some(description);
        }
        if let Some(due_date) = patch.due_date {
            assignment.due_date = due_date;
        }
        Ok(assignment.clone())
    }

    fn delete_assignment(&self, id: AssignmentId) -> DomainResult<()> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        world
            .assignments
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::NotFound)
    }

    fn submit_assignment(
        &self,
        id: AssignmentId,
        draft: SubmissionDraft,
    ) -> DomainResult<Assignment> {
        draft.validate()?;
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.students.contains_key(&draft.student_id) {
            return Err(DomainError::validation(
                "studentId",
                "must reference an existing student profile",
            ));
        }
        let assignment = world
            .assignments
            .get_mut(&id)
            .ok_or(DomainError::NotFound)?;

        let existing = assignment
            .submissions
            .iter_mut()
            .find(|s| s.student_id == draft.student_id);
        match existing {
            Some(submission) if submission.status == SubmissionStatus::Resubmit => {
                submission.content = draft.content;
                submission.submitted_at = Utc::now();
                submission.grade = None;
                submission.feedback = None;
                submission.status = SubmissionStatus::Submitted;
            }
            Some(_) => {
                return Err(DomainError::conflict(
                    "studentId",
                    "a submission already exists for this student",
                ));
            }
            None => assignment.submissions.push(Submission {
                student_id: draft.student_id,
                content: draft.content,
                submitted_at: Utc::now(),
                grade: None,
                feedback: None,
                status: SubmissionStatus::Submitted,
            }),
        }
        Ok(assignment.clone())
    }

    fn grade_submission(
        &self,
        id: AssignmentId,
        student_id: StudentProfileId,
        grade: u32,
        feedback: Option<String>,
    ) -> DomainResult<Assignment> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        let assignment = world
            .assignments
            .get_mut(&id)
            .ok_or(DomainError::NotFound)?;

        if grade > assignment.total_marks {
            return Err(DomainError::validation(
                "grade",
                "must not exceed totalMarks",
            ));
        }
        let submission = assignment
            .submissions
            .iter_mut()
            .find(|s| s.student_id == student_id)
            .ok_or(DomainError::NotFound)?;
        submission.grade = Some(grade);
        submission.feedback = feedback;
        submission.status = SubmissionStatus::Graded;
        Ok(assignment.clone())
    }

    // ── Notices ─────────────────────────────────────────────────────────────

    fn create_notice(&self, draft: NoticeDraft) -> DomainResult<Notice> {
        draft.validate()?;
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        if !world.identities.contains_key(&draft.author_id) {
            return Err(DomainError::validation(
                "authorId",
                "must reference an existing identity",
            ));
        }
        let notice = draft.into_notice(NoticeId::new(), Utc::now());
        world.notices.insert(notice.id, notice.clone());
        Ok(notice)
    }

    fn notice_by_id(&self, id: NoticeId) -> DomainResult<Option<Notice>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        Ok(world.notices.get(&id).cloned())
    }

    fn list_notices(
        &self,
        filter: &NoticeFilter,
        page: &PageRequest,
    ) -> DomainResult<Page<Notice>> {
        let world = self.world.read().map_err(|_| lock_poisoned())?;
        let now = Utc::now();
        let items: Vec<Notice> = world
            .notices
            .values()
            .filter(|n| filter.kind.is_none_or(|k| n.kind == k))
            .filter(|n| filter.priority.is_none_or(|p| n.priority == p))
            .filter(|n| filter.pinned.is_none_or(|p| n.pinned == p))
            .filter(|n| !filter.active_only || n.is_active_at(now))
            .filter(|n| matches_search(&page.search, &[&n.title, &n.content]))
            .cloned()
            .collect();

        let sort_by = page.sort_by.as_deref();
        Ok(finish(items, page, move |a, b| match sort_by {
            Some("title") => a.title.cmp(&b.title),
            _ => a.created_at.cmp(&b.created_at),
        }))
    }

    fn update_notice(&self, id: NoticeId, patch: NoticePatch) -> DomainResult<Notice> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        let Some(current) = world.notices.get(&id).cloned() else {
            return Err(DomainError::NotFound);
        };

        let start_date = patch.start_date.or(current.start_date);
        let end_date = patch.end_date.or(current.end_date);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                return Err(DomainError::validation_all(vec![
                    campus_core::FieldError::new("startDate", "must not be after endDate"),
                    campus_core::FieldError::new("endDate", "must not be before startDate"),
                ]));
            }
        }

        let notice = world.notices.get_mut(&id).ok_or(DomainError::NotFound)?;
        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title", "must not be empty"));
            }
            notice.title = title.trim().to_string();
        }
        if let Some(content) = patch.content {
            notice.content = content;
        }
        if let Some(kind) = patch.kind {
            notice.kind = kind;
        }
        if let Some(priority) = patch.priority {
            notice.priority = priority;
        }
        if let Some(audience) = patch.audience {
            notice.audience = audience;
        }
        notice.start_date = start_date;
        notice.end_date = end_date;
        if let Some(pinned) = patch.pinned {
            notice.pinned = pinned;
        }
        Ok(notice.clone())
    }

    fn delete_notice(&self, id: NoticeId) -> DomainResult<()> {
        let mut world = self.world.write().map_err(|_| lock_poisoned())?;
        world
            .notices
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Gender;
    use crate::subject::SubjectKind;
    use std::sync::Arc;

    fn identity_draft(email: &str, role: Role) -> IdentityDraft {
        IdentityDraft {
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            name: "Test Person".to_string(),
            role,
            phone: None,
            address: None,
            date_of_birth: None,
            gender: Some(Gender::Other),
        }
    }

    fn subject_draft(code: &str) -> SubjectDraft {
        SubjectDraft {
            code: code.to_string(),
            name: "Mathematics".to_string(),
            department: "Science".to_string(),
            kind: SubjectKind::Core,
            credits: 4,
            total_marks: 100,
            passing_marks: 35,
        }
    }

    fn class_draft(name: &str) -> ClassSectionDraft {
        ClassSectionDraft {
            name: name.to_string(),
            section: "A".to_string(),
            academic_year: "2025-2026".to_string(),
            capacity: 2,
            room: None,
            class_teacher: None,
            subjects: vec![],
        }
    }

    /// Create a student identity + profile pair, returning the profile id.
    fn seeded_student(store: &MemoryStore, email: &str, code: &str) -> StudentProfileId {
        let identity = store
            .create_identity(identity_draft(email, Role::Student))
            .unwrap();
        store
            .create_student_profile(StudentProfileDraft {
                user_id: identity.id,
                student_code: code.to_string(),
                class_id: None,
                parent_name: None,
                parent_phone: None,
                parent_email: None,
            })
            .unwrap()
            .id
    }

    fn seeded_teacher(store: &MemoryStore, email: &str, code: &str) -> TeacherProfileId {
        let identity = store
            .create_identity(identity_draft(email, Role::Teacher))
            .unwrap();
        store
            .create_teacher_profile(TeacherProfileDraft {
                user_id: identity.id,
                employee_code: code.to_string(),
                department: "Science".to_string(),
                designation: "Lecturer".to_string(),
                subject_ids: vec![],
                is_class_teacher: false,
                class_id: None,
            })
            .unwrap()
            .id
    }

    #[test]
    fn duplicate_email_is_a_conflict_naming_email() {
        let store = MemoryStore::new();
        store
            .create_identity(identity_draft("a@x.com", Role::Student))
            .unwrap();
        let err = store
            .create_identity(identity_draft("A@X.COM", Role::Teacher))
            .unwrap_err();
        match err {
            DomainError::Conflict { field, .. } => assert_eq!(field, "email"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn racing_creates_with_one_email_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.create_identity(identity_draft("race@x.com", Role::Student))
            }));
        }
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        for failure in results.iter().filter(|r| r.is_err()) {
            assert!(matches!(
                failure.as_ref().unwrap_err(),
                DomainError::Conflict { field, .. } if field == "email"
            ));
        }
    }

    #[test]
    fn find_by_id_is_idempotent() {
        let store = MemoryStore::new();
        let created = store
            .create_identity(identity_draft("a@x.com", Role::Student))
            .unwrap();
        let first = store.identity_by_id(created.id).unwrap().unwrap();
        let second = store.identity_by_id(created.id).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn subject_with_passing_above_total_names_the_field() {
        let store = MemoryStore::new();
        let mut draft = subject_draft("PHY101");
        draft.passing_marks = 150;
        let err = store.create_subject(draft).unwrap_err();
        assert!(
            err.field_errors()
                .unwrap()
                .iter()
                .any(|f| f.field == "passingMarks")
        );
    }

    #[test]
    fn duplicate_subject_code_conflicts_case_insensitively() {
        let store = MemoryStore::new();
        store.create_subject(subject_draft("MATH101")).unwrap();
        let err = store.create_subject(subject_draft("math101")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict { field, .. } if field == "code"));
    }

    #[test]
    fn deleting_a_subject_referenced_by_an_assignment_conflicts() {
        let store = MemoryStore::new();
        let subject = store.create_subject(subject_draft("CHEM101")).unwrap();
        let class = store.create_class(class_draft("Grade 9")).unwrap();
        let teacher = seeded_teacher(&store, "t@x.com", "EMP-1");
        store
            .create_assignment(AssignmentDraft {
                class_id: class.id,
                subject_id: subject.id,
                teacher_id: teacher,
                title: "Lab report".to_string(),
                description: None,
                due_date: Utc::now(),
                total_marks: 20,
            })
            .unwrap();

        let err = store.delete_subject(subject.id).unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
        // Subject remains in the store.
        assert!(store.subject_by_id(subject.id).unwrap().is_some());
    }

    #[test]
    fn profile_role_must_match_identity_role() {
        let store = MemoryStore::new();
        let teacher_identity = store
            .create_identity(identity_draft("t@x.com", Role::Teacher))
            .unwrap();
        let err = store
            .create_student_profile(StudentProfileDraft {
                user_id: teacher_identity.id,
                student_code: "STU-1".to_string(),
                class_id: None,
                parent_name: None,
                parent_phone: None,
                parent_email: None,
            })
            .unwrap_err();
        assert!(
            err.field_errors()
                .unwrap()
                .iter()
                .any(|f| f.field == "userId")
        );
    }

    #[test]
    fn second_profile_for_one_identity_conflicts() {
        let store = MemoryStore::new();
        let identity = store
            .create_identity(identity_draft("s@x.com", Role::Student))
            .unwrap();
        let draft = StudentProfileDraft {
            user_id: identity.id,
            student_code: "STU-1".to_string(),
            class_id: None,
            parent_name: None,
            parent_phone: None,
            parent_email: None,
        };
        store.create_student_profile(draft.clone()).unwrap();
        let err = store
            .create_student_profile(StudentProfileDraft {
                student_code: "STU-2".to_string(),
                ..draft
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { field, .. } if field == "userId"));
    }

    #[test]
    fn class_teacher_must_resolve_to_a_teacher_profile() {
        let store = MemoryStore::new();
        let class = store.create_class(class_draft("Grade 7")).unwrap();
        let err = store
            .update_class(
                class.id,
                ClassSectionPatch {
                    class_teacher: Some(Some(TeacherProfileId::new())),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(
            err.field_errors()
                .unwrap()
                .iter()
                .any(|f| f.field == "classTeacher")
        );
    }

    #[test]
    fn deactivated_teacher_cannot_head_a_class() {
        let store = MemoryStore::new();
        let teacher_identity = store
            .create_identity(identity_draft("t@x.com", Role::Teacher))
            .unwrap();
        let teacher = store
            .create_teacher_profile(TeacherProfileDraft {
                user_id: teacher_identity.id,
                employee_code: "EMP-9".to_string(),
                department: "Arts".to_string(),
                designation: "Lecturer".to_string(),
                subject_ids: vec![],
                is_class_teacher: false,
                class_id: None,
            })
            .unwrap();
        store
            .update_identity(
                teacher_identity.id,
                IdentityPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        let mut draft = class_draft("Grade 6");
        draft.class_teacher = Some(teacher.id);
        let err = store.create_class(draft).unwrap_err();
        assert!(
            err.field_errors()
                .unwrap()
                .iter()
                .any(|f| f.field == "classTeacher")
        );
    }

    #[test]
    fn duplicate_class_key_conflicts() {
        let store = MemoryStore::new();
        store.create_class(class_draft("Grade 8")).unwrap();
        let err = store.create_class(class_draft("Grade 8")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[test]
    fn enrollment_respects_capacity_and_duplicates() {
        let store = MemoryStore::new();
        let class = store.create_class(class_draft("Grade 5")).unwrap(); // capacity 2
        let s1 = seeded_student(&store, "s1@x.com", "STU-1");
        let s2 = seeded_student(&store, "s2@x.com", "STU-2");
        let s3 = seeded_student(&store, "s3@x.com", "STU-3");

        store.enroll_student(class.id, s1).unwrap();
        let err = store.enroll_student(class.id, s1).unwrap_err();
        assert!(matches!(err, DomainError::Conflict { field, .. } if field == "studentId"));

        store.enroll_student(class.id, s2).unwrap();
        let err = store.enroll_student(class.id, s3).unwrap_err();
        assert!(matches!(err, DomainError::Conflict { field, .. } if field == "capacity"));

        // Enrollment is mirrored on the student profile.
        let profile = store.student_profile_by_id(s1).unwrap().unwrap();
        assert_eq!(profile.class_id, Some(class.id));

        store.unenroll_student(class.id, s1).unwrap();
        let profile = store.student_profile_by_id(s1).unwrap().unwrap();
        assert_eq!(profile.class_id, None);
    }

    #[test]
    fn patching_class_id_moves_and_clears_roster_membership() {
        let store = MemoryStore::new();
        let first = store.create_class(class_draft("Grade 6")).unwrap();
        let second = store.create_class(class_draft("Grade 7")).unwrap();
        let student = seeded_student(&store, "s@x.com", "STU-4");
        store.enroll_student(first.id, student).unwrap();

        // Patching to another class leaves the old roster and joins the new.
        let profile = store
            .update_student_profile(
                student,
                StudentProfilePatch {
                    class_id: Some(Some(second.id)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(profile.class_id, Some(second.id));
        let first = store.class_by_id(first.id).unwrap().unwrap();
        assert!(!first.students.contains(&student));
        let second_class = store.class_by_id(second.id).unwrap().unwrap();
        assert!(second_class.students.contains(&student));

        // Patching to null clears membership; an absent field changes nothing.
        let profile = store
            .update_student_profile(
                student,
                StudentProfilePatch {
                    class_id: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(profile.class_id, None);
        let second_class = store.class_by_id(second.id).unwrap().unwrap();
        assert!(second_class.students.is_empty());

        let profile = store
            .update_student_profile(student, StudentProfilePatch::default())
            .unwrap();
        assert_eq!(profile.class_id, None);
    }

    #[test]
    fn patching_into_a_full_class_is_a_capacity_conflict() {
        let store = MemoryStore::new();
        let class = store.create_class(class_draft("Grade 9")).unwrap(); // capacity 2
        let s1 = seeded_student(&store, "s1@x.com", "STU-5");
        let s2 = seeded_student(&store, "s2@x.com", "STU-6");
        let s3 = seeded_student(&store, "s3@x.com", "STU-7");
        store.enroll_student(class.id, s1).unwrap();
        store.enroll_student(class.id, s2).unwrap();

        let err = store
            .update_student_profile(
                s3,
                StudentProfilePatch {
                    class_id: Some(Some(class.id)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { field, .. } if field == "capacity"));
        let profile = store.student_profile_by_id(s3).unwrap().unwrap();
        assert_eq!(profile.class_id, None);
    }

    #[test]
    fn second_submission_conflicts_until_resubmit_is_requested() {
        let store = MemoryStore::new();
        let subject = store.create_subject(subject_draft("ENG101")).unwrap();
        let class = store.create_class(class_draft("Grade 4")).unwrap();
        let teacher = seeded_teacher(&store, "t@x.com", "EMP-2");
        let student = seeded_student(&store, "s@x.com", "STU-9");
        let assignment = store
            .create_assignment(AssignmentDraft {
                class_id: class.id,
                subject_id: subject.id,
                teacher_id: teacher,
                title: "Essay".to_string(),
                description: None,
                due_date: Utc::now(),
                total_marks: 50,
            })
            .unwrap();

        store
            .submit_assignment(
                assignment.id,
                SubmissionDraft {
                    student_id: student,
                    content: "first draft".to_string(),
                },
            )
            .unwrap();
        let err = store
            .submit_assignment(
                assignment.id,
                SubmissionDraft {
                    student_id: student,
                    content: "second draft".to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { field, .. } if field == "studentId"));
    }

    #[test]
    fn grade_above_total_marks_names_grade() {
        let store = MemoryStore::new();
        let subject = store.create_subject(subject_draft("BIO101")).unwrap();
        let class = store.create_class(class_draft("Grade 3")).unwrap();
        let teacher = seeded_teacher(&store, "t@x.com", "EMP-3");
        let student = seeded_student(&store, "s@x.com", "STU-8");
        let assignment = store
            .create_assignment(AssignmentDraft {
                class_id: class.id,
                subject_id: subject.id,
                teacher_id: teacher,
                title: "Quiz".to_string(),
                description: None,
                due_date: Utc::now(),
                total_marks: 10,
            })
            .unwrap();
        store
            .submit_assignment(
                assignment.id,
                SubmissionDraft {
                    student_id: student,
                    content: "answers".to_string(),
                },
            )
            .unwrap();

        let err = store
            .grade_submission(assignment.id, student, 11, None)
            .unwrap_err();
        assert!(
            err.field_errors()
                .unwrap()
                .iter()
                .any(|f| f.field == "grade")
        );

        let graded = store
            .grade_submission(assignment.id, student, 9, Some("good".to_string()))
            .unwrap();
        let submission = graded.submission_for(student).unwrap();
        assert_eq!(submission.grade, Some(9));
        assert_eq!(submission.status, SubmissionStatus::Graded);
    }

    #[test]
    fn deleting_identity_with_profile_deactivates_instead() {
        let store = MemoryStore::new();
        let student = seeded_student(&store, "s@x.com", "STU-7");
        let profile = store.student_profile_by_id(student).unwrap().unwrap();

        match store.delete_identity(profile.user_id).unwrap() {
            IdentityRemoval::Deactivated(identity) => assert!(!identity.is_active),
            IdentityRemoval::Deleted => panic!("expected deactivation"),
        }
        // Still present, just inactive.
        let identity = store.identity_by_id(profile.user_id).unwrap().unwrap();
        assert!(!identity.is_active);
    }

    #[test]
    fn deleting_unreferenced_identity_removes_it() {
        let store = MemoryStore::new();
        let identity = store
            .create_identity(identity_draft("gone@x.com", Role::Helper))
            .unwrap();
        assert_eq!(
            store.delete_identity(identity.id).unwrap(),
            IdentityRemoval::Deleted
        );
        assert!(store.identity_by_id(identity.id).unwrap().is_none());
    }

    #[test]
    fn list_identities_filters_searches_and_paginates() {
        let store = MemoryStore::new();
        for i in 0..15 {
            store
                .create_identity(identity_draft(&format!("user{i}@x.com"), Role::Student))
                .unwrap();
        }
        store
            .create_identity(identity_draft("admin@x.com", Role::Admin))
            .unwrap();

        let page = store
            .list_identities(
                &IdentityFilter {
                    role: Some(Role::Student),
                    is_active: None,
                },
                &PageRequest::default(),
            )
            .unwrap();
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.pagination.total, 15);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(page.pagination.has_next);

        let search = store
            .list_identities(
                &IdentityFilter::default(),
                &PageRequest::new(None, None, Some("ADMIN".to_string()), None, None),
            )
            .unwrap();
        assert_eq!(search.pagination.total, 1);
        assert_eq!(search.data[0].email, "admin@x.com");
    }

    #[test]
    fn default_sort_is_newest_first() {
        let store = MemoryStore::new();
        let a = store
            .create_identity(identity_draft("first@x.com", Role::Student))
            .unwrap();
        let b = store
            .create_identity(identity_draft("second@x.com", Role::Student))
            .unwrap();

        let page = store
            .list_identities(&IdentityFilter::default(), &PageRequest::default())
            .unwrap();
        assert_eq!(page.data[0].id, b.id);
        assert_eq!(page.data[1].id, a.id);

        let asc = store
            .list_identities(
                &IdentityFilter::default(),
                &PageRequest::new(None, None, None, None, Some(SortOrder::Asc)),
            )
            .unwrap();
        assert_eq!(asc.data[0].id, a.id);
    }

    #[test]
    fn seed_admin_runs_once() {
        let store = MemoryStore::new();
        assert!(store.seed_admin("root@x.com", "$hash", "Root").unwrap());
        assert!(!store.seed_admin("root@x.com", "$hash", "Root").unwrap());
        let admin = store.identity_by_email("root@x.com").unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
