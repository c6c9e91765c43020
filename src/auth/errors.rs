//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Every way credential handling can fail.
///
/// The variants exist for diagnostics only. At the HTTP boundary every
/// credential failure collapses into a single "Unauthorized" response; only
/// the backend failures (see [`AuthError::is_server_fault`]) become a 500.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,
    #[error("malformed credential")]
    MalformedCredential,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("unsupported signing algorithm")]
    UnsupportedSigningAlgorithm,
    #[error("token expired")]
    TokenExpired,
    #[error("token revoked")]
    TokenRevoked,
    #[error("token not found")]
    TokenNotFound,
    #[error("token subject is not a valid identity")]
    UnparseableIdentity,
    #[error("api key mismatch")]
    ApiKeyMismatch,
    #[error("password mismatch")]
    PasswordMismatch,
    #[error("malformed password hash")]
    MalformedHash,
    #[error("failed to sign token: {0}")]
    SigningFailure(String),
    #[error("hashing failure: {0}")]
    HashingFailure(String),
    #[error("token store failure: {0}")]
    Storage(#[from] crate::refresh::StoreError),
}

impl AuthError {
    /// True for failures that are our fault rather than the caller's.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::HashingFailure(_) | Self::SigningFailure(_) | Self::Storage(_)
        )
    }
}

/// Rejection produced by the auth extractors.
///
/// The response body never reveals which check failed.
#[derive(Debug)]
pub struct ApiAuthError(pub AuthError);

impl From<AuthError> for ApiAuthError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        let (status, message) = if self.0.is_server_fault() {
            tracing::error!(error = %self.0, "Authentication backend failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        } else {
            tracing::debug!(reason = %self.0, "Request rejected");
            (StatusCode::UNAUTHORIZED, "Unauthorized")
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_backend_failures_are_server_faults() {
        assert!(AuthError::HashingFailure("boom".into()).is_server_fault());
        assert!(!AuthError::TokenExpired.is_server_fault());
        assert!(!AuthError::InvalidSignature.is_server_fault());
        assert!(!AuthError::PasswordMismatch.is_server_fault());
    }

    #[tokio::test]
    async fn test_rejection_does_not_leak_reason() {
        for err in [
            AuthError::TokenExpired,
            AuthError::InvalidSignature,
            AuthError::TokenRevoked,
            AuthError::MissingCredential,
        ] {
            let response = ApiAuthError(err).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], "Unauthorized");
        }
    }
}
