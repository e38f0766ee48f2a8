//! The closed role taxonomy.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role carried by every identity and every session token.
///
/// This is a closed enumeration, never free text. `SuperAdmin` and
/// `Temporary` exist for deployments that enable them; the enabled subset is
/// configuration (see the API crate's `AppConfig`), defaulting to the four
/// core roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Student,
    Teacher,
    Admin,
    Helper,
    SuperAdmin,
    Temporary,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::Helper => "helper",
            Role::SuperAdmin => "super-admin",
            Role::Temporary => "temporary",
        }
    }

    /// The default enabled set: `student, teacher, admin, helper`.
    pub fn core_set() -> HashSet<Role> {
        HashSet::from([Role::Student, Role::Teacher, Role::Admin, Role::Helper])
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            "helper" => Ok(Role::Helper),
            "super-admin" => Ok(Role::SuperAdmin),
            "temporary" => Ok(Role::Temporary),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_roundtrip_through_strings() {
        for role in [
            Role::Student,
            Role::Teacher,
            Role::Admin,
            Role::Helper,
            Role::SuperAdmin,
            Role::Temporary,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super-admin\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"student\"").unwrap(),
            Role::Student
        );
    }

    #[test]
    fn free_text_is_rejected() {
        assert!("root".parse::<Role>().is_err());
    }
}
