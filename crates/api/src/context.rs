use campus_auth::Role;
use campus_core::UserId;

/// The authenticated identity for a request, inserted by the auth middleware
/// and present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}
