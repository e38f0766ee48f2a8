//! Session token service.
//!
//! Compact signed tokens (HS256) encoding identity and role. Verification is
//! a single deterministic function of (token, now) with no side effects and
//! no implicit refresh. The signing secret is process-wide configuration;
//! rotating it invalidates all outstanding tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use campus_core::UserId;

use crate::Role;

/// Default session lifetime: 7 days.
pub fn default_lifetime() -> Duration {
    Duration::days(7)
}

/// Decoded, verified contents of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / identity id.
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("session token has expired")]
    Expired,

    #[error("session token is invalid")]
    Invalid,
}

/// Issues and verifies session tokens with a server-held secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a signed token for an authenticated identity.
    pub fn issue(
        &self,
        sub: UserId,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims {
            sub,
            email: email.to_string(),
            role,
            issued_at: now,
            expires_at: now + self.lifetime,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify signature and expiry against the supplied clock reading.
    ///
    /// Expiry is checked here (not by the JWT library) so the boundary is
    /// exact: valid strictly before `expires_at`, expired at and after it.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;
        let claims = data.claims;

        if claims.expires_at <= claims.issued_at {
            return Err(TokenError::Invalid);
        }
        if now >= claims.expires_at {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", default_lifetime())
    }

    #[test]
    fn issue_then_verify_roundtrips_claims() {
        let svc = service();
        let sub = UserId::new();
        let now = Utc::now();

        let token = svc.issue(sub, "a@x.com", Role::Teacher, now).unwrap();
        let claims = svc.verify(&token, now).unwrap();

        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Teacher);
        assert_eq!(claims.expires_at, now + default_lifetime());
    }

    #[test]
    fn token_is_valid_strictly_before_expiry_and_expired_at_it() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue(UserId::new(), "a@x.com", Role::Student, now).unwrap();

        let just_before = now + default_lifetime() - Duration::seconds(1);
        assert!(svc.verify(&token, just_before).is_ok());

        let at_expiry = now + default_lifetime();
        assert_eq!(svc.verify(&token, at_expiry).unwrap_err(), TokenError::Expired);

        let eight_days = now + Duration::days(8);
        assert_eq!(svc.verify(&token, eight_days).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn wrong_secret_is_invalid_not_expired() {
        let now = Utc::now();
        let token = service()
            .issue(UserId::new(), "a@x.com", Role::Admin, now)
            .unwrap();

        let other = TokenService::new(b"other-secret", default_lifetime());
        assert_eq!(other.verify(&token, now).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn malformed_token_is_invalid() {
        let svc = service();
        assert_eq!(
            svc.verify("not.a.token", Utc::now()).unwrap_err(),
            TokenError::Invalid
        );
        assert_eq!(svc.verify("", Utc::now()).unwrap_err(), TokenError::Invalid);
    }
}
