//! Bearer token checking
//!
//! The API is guarded by a single configured token sent as
//! `Authorization: Bearer <token>`. An empty configured token disables the
//! guard. Tokens are compared through their SHA-256 digests so the
//! comparison time does not depend on how many leading bytes match.

use sha2::{Digest, Sha256};

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuthError {
    /// No Authorization header, or not a Bearer credential
    MissingToken,

    /// Token does not match the configured one
    InvalidToken,
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::MissingToken => write!(f, "Missing bearer token"),
            ApiAuthError::InvalidToken => write!(f, "Invalid bearer token"),
        }
    }
}

impl std::error::Error for ApiAuthError {}

/// Extract the token from an `Authorization` header value
///
/// ```
/// use catalog_common::api::auth::bearer_token;
///
/// assert_eq!(bearer_token("Bearer abc"), Some("abc"));
/// assert_eq!(bearer_token("Basic abc"), None);
/// ```
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Compare a provided token against the configured one
pub fn token_matches(provided: &str, expected: &str) -> bool {
    let a = digest(provided);
    let b = digest(expected);
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Validate an optional `Authorization` header against the configured token
///
/// `expected = None` (or empty) disables checking.
pub fn check_authorization(
    header_value: Option<&str>,
    expected: Option<&str>,
) -> Result<(), ApiAuthError> {
    let Some(expected) = expected.filter(|t| !t.is_empty()) else {
        return Ok(());
    };

    let provided = header_value
        .and_then(bearer_token)
        .ok_or(ApiAuthError::MissingToken)?;

    if token_matches(provided, expected) {
        Ok(())
    } else {
        Err(ApiAuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_scheme_case_insensitive() {
        assert_eq!(bearer_token("bearer  xyz "), Some("xyz"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("xyz"), None);
    }

    #[test]
    fn test_token_matches() {
        assert!(token_matches("secret", "secret"));
        assert!(!token_matches("secret", "secreT"));
        assert!(!token_matches("", "secret"));
    }

    #[test]
    fn test_disabled_guard_accepts_anything() {
        assert_eq!(check_authorization(None, None), Ok(()));
        assert_eq!(check_authorization(None, Some("")), Ok(()));
    }

    #[test]
    fn test_guard_errors() {
        assert_eq!(
            check_authorization(None, Some("t0k")),
            Err(ApiAuthError::MissingToken)
        );
        assert_eq!(
            check_authorization(Some("Bearer nope"), Some("t0k")),
            Err(ApiAuthError::InvalidToken)
        );
        assert_eq!(check_authorization(Some("Bearer t0k"), Some("t0k")), Ok(()));
    }
}
