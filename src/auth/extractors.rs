//! Axum extractors for authentication.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

use super::credentials::{api_key, bearer_token};
use super::errors::{ApiAuthError, AuthError};
use super::state::{AuthBackend, HasAuthBackend};
use super::types::{Authorization, Identity, Scheme};

/// Decide whether the request headers authorize the caller under `scheme`.
pub fn authorize(
    headers: &HeaderMap,
    backend: &AuthBackend,
    scheme: Scheme,
) -> Result<Authorization, AuthError> {
    match scheme {
        Scheme::Bearer => {
            let token = bearer_token(headers)?;
            backend.codec.verify(token).map(Authorization::User)
        }
        Scheme::ApiKey => {
            let key = api_key(headers)?;
            if key == &*backend.partner_key {
                Ok(Authorization::Partner)
            } else {
                Err(AuthError::ApiKeyMismatch)
            }
        }
    }
}

/// Extractor for endpoints that require an authenticated end user.
///
/// The handler only ever sees the resolved identity, never the raw token.
/// On any failure the handler is not invoked and the client gets a bare 401.
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match authorize(&parts.headers, state.auth(), Scheme::Bearer)? {
            Authorization::User(identity) => Ok(Auth(identity)),
            Authorization::Partner => Err(AuthError::MalformedCredential.into()),
        }
    }
}

/// Extractor for the partner webhook. Bypasses access tokens entirely.
pub struct PartnerAuth;

impl<S> FromRequestParts<S> for PartnerAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match authorize(&parts.headers, state.auth(), Scheme::ApiKey)? {
            Authorization::Partner => Ok(PartnerAuth),
            Authorization::User(_) => Err(AuthError::MalformedCredential.into()),
        }
    }
}
