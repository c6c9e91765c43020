//! Credential extraction from the `Authorization` header.
//!
//! Purely syntactic: nothing here checks whether a credential is valid.

use axum::http::{HeaderMap, header::AUTHORIZATION};

use super::errors::AuthError;

/// Scheme prefix for access and refresh tokens.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Scheme prefix for the partner API key.
pub const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    credential_with_prefix(headers, BEARER_PREFIX)
}

/// Extract the key from `Authorization: ApiKey <key>`.
pub fn api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    credential_with_prefix(headers, API_KEY_PREFIX)
}

fn credential_with_prefix<'a>(headers: &'a HeaderMap, prefix: &str) -> Result<&'a str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;

    value
        .strip_prefix(prefix)
        .ok_or(AuthError::MalformedCredential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token() {
        let headers = headers_with("Bearer abc123");
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_bearer_without_scheme() {
        let headers = headers_with("abc123");
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MalformedCredential)
        ));
    }

    #[test]
    fn test_bearer_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredential)
        ));
    }

    #[test]
    fn test_bearer_prefix_is_case_sensitive() {
        for value in ["bearer abc123", "BEARER abc123", "Bearerabc123"] {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
            assert!(matches!(
                bearer_token(&headers),
                Err(AuthError::MalformedCredential)
            ));
        }
    }

    #[test]
    fn test_api_key() {
        let headers = headers_with("ApiKey f271c81ff7084ee5b99a5091b42d486e");
        assert_eq!(
            api_key(&headers).unwrap(),
            "f271c81ff7084ee5b99a5091b42d486e"
        );
    }

    #[test]
    fn test_schemes_do_not_cross() {
        let headers = headers_with("Bearer abc123");
        assert!(matches!(
            api_key(&headers),
            Err(AuthError::MalformedCredential)
        ));

        let headers = headers_with("ApiKey abc123");
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MalformedCredential)
        ));
    }
}
