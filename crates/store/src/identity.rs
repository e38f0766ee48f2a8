//! Identity — the authentication-bearing record for a person.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use campus_auth::Role;
use campus_core::{DomainError, DomainResult, FieldError, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// One identity per natural person.
///
/// # Invariants
/// - Email is globally unique, stored lowercase, compared case-insensitively.
/// - The password hash is never present in any serialized representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an identity. The password arrives here already hashed;
/// hashing is the caller's explicit step, never a store hook.
#[derive(Debug, Clone)]
pub struct IdentityDraft {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl IdentityDraft {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            errors.push(FieldError::new("email", "must be a valid email address"));
        }
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "must not be empty"));
        }
        if self.password_hash.is_empty() {
            errors.push(FieldError::new("password", "must not be empty"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation_all(errors))
        }
    }

    pub(crate) fn into_identity(self, id: UserId, now: DateTime<Utc>) -> Identity {
        Identity {
            id,
            email: self.email.trim().to_lowercase(),
            password_hash: self.password_hash,
            name: self.name.trim().to_string(),
            role: self.role,
            is_active: true,
            phone: self.phone,
            address: self.address,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            last_login_at: None,
            created_at: now,
        }
    }
}

/// Partial update. `Some` fields are applied; `None` fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub password_hash: Option<String>,
}

/// Equality filters accepted by the identity list operation.
#[derive(Debug, Clone, Default)]
pub struct IdentityFilter {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> IdentityDraft {
        IdentityDraft {
            email: "A@X.com".into(),
            password_hash: "$argon2id$stub".into(),
            name: "  Ada  ".into(),
            role: Role::Student,
            phone: None,
            address: None,
            date_of_birth: None,
            gender: None,
        }
    }

    #[test]
    fn email_is_lowercased_and_name_trimmed() {
        let identity = draft().into_identity(UserId::new(), Utc::now());
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.name, "Ada");
        assert!(identity.is_active);
    }

    #[test]
    fn invalid_email_and_empty_name_are_both_reported() {
        let mut d = draft();
        d.email = "nope".into();
        d.name = " ".into();
        let err = d.validate().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().any(|f| f.field == "email"));
        assert!(fields.iter().any(|f| f.field == "name"));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let identity = draft().into_identity(UserId::new(), Utc::now());
        let json = serde_json::to_value(&identity).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@x.com");
    }
}
