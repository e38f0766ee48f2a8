//! `campus-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP routing and storage:
//! password hashing, session token issue/verify, the session-cookie carrier
//! and the pure role policy check all live here. The one store-dependent
//! step (re-checking that an identity is still active) belongs to the API
//! layer, which owns the store handle.

pub mod cookie;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;

pub use cookie::{SESSION_COOKIE, clear_cookie, extract_token, session_cookie};
pub use password::{AuthError, MIN_PASSWORD_LEN, dummy_verify, hash_password, verify_password};
pub use policy::{AuthzError, authorize};
pub use roles::{Role, UnknownRole};
pub use token::{SessionClaims, TokenError, TokenService, default_lifetime};
