//! Session cookie carrier.
//!
//! A transport concern only: these helpers bind a token to the session
//! cookie and read it back. They never interpret the token.

use http::header::COOKIE;
use http::{HeaderMap, HeaderValue};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "campus_session";

/// Build the `Set-Cookie` value carrying a freshly issued token.
///
/// `HttpOnly`, scoped to `/`, `SameSite=Lax`, max-age matching the token
/// lifetime; `Secure` outside local development.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Option<HeaderValue> {
    let secure_attr = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; Max-Age={max_age_secs}; SameSite=Lax{secure_attr}"
    ))
    .ok()
}

/// Build the `Set-Cookie` value that removes the session cookie (logout).
pub fn clear_cookie(secure: bool) -> HeaderValue {
    let secure_attr = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; Path=/; SameSite=Lax{secure_attr}"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Extract the session token from the request's `Cookie` header, if present.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';').map(str::trim).find_map(|pair| {
        let value = pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('=')?;
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_sets_httponly_path_and_max_age() {
        let v = session_cookie("tok123", 604800, false).unwrap();
        let s = v.to_str().unwrap();
        assert!(s.starts_with("campus_session=tok123"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("Path=/"));
        assert!(s.contains("Max-Age=604800"));
        assert!(!s.contains("Secure"));
    }

    #[test]
    fn secure_flag_is_appended_in_production() {
        let v = session_cookie("tok", 60, true).unwrap();
        assert!(v.to_str().unwrap().ends_with("Secure"));
    }

    #[test]
    fn extract_finds_the_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; campus_session=abc.def.ghi; lang=en"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn extract_returns_none_when_absent_or_empty() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("campus_session="));
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn clear_cookie_expires_in_the_past() {
        let v = clear_cookie(false);
        assert!(v.to_str().unwrap().contains("Expires=Thu, 01 Jan 1970"));
    }
}
