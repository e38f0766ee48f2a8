//! Process configuration, read once at startup.

use std::collections::HashSet;

use campus_auth::Role;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HS256 signing secret for session tokens. Rotating it logs everyone out.
    pub session_secret: String,
    pub bind_addr: String,
    /// `Secure` attribute on session cookies; on outside local development.
    pub secure_cookies: bool,
    /// Roles accepted by this deployment. Identities carrying a role outside
    /// this set cannot be created or log in.
    pub enabled_roles: HashSet<Role>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let session_secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| {
            tracing::warn!("SESSION_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let secure_cookies = std::env::var("APP_ENV")
            .map(|e| e.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Self {
            session_secret,
            bind_addr,
            secure_cookies,
            enabled_roles: enabled_roles_from_env(),
        }
    }

    /// Fixed-secret configuration for in-process test servers.
    pub fn for_tests(secret: &str) -> Self {
        Self {
            session_secret: secret.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            secure_cookies: false,
            enabled_roles: Role::core_set(),
        }
    }
}

/// Parse `ENABLED_ROLES` (comma-separated role names). Unknown names are
/// logged and skipped; unset or fully-invalid input falls back to the core
/// four roles.
fn enabled_roles_from_env() -> HashSet<Role> {
    let Ok(raw) = std::env::var("ENABLED_ROLES") else {
        return Role::core_set();
    };
    let mut roles = HashSet::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.parse::<Role>() {
            Ok(role) => {
                roles.insert(role);
            }
            Err(e) => tracing::warn!(error = %e, "ignoring unknown entry in ENABLED_ROLES"),
        }
    }
    if roles.is_empty() {
        tracing::warn!("ENABLED_ROLES contained no valid roles; using the core set");
        return Role::core_set();
    }
    roles
}
