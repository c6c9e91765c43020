//! Refresh token lifecycle.
//!
//! Refresh tokens are opaque 256-bit random values, hex-encoded and stored
//! server-side. They live for 60 days and are never rotated: renewing an
//! access token leaves the refresh token untouched. Revocation is a one-way
//! soft tombstone, and expiry is computed on read rather than written.

use async_trait::async_trait;
use rand::RngCore;
use tracing::{debug, info};

use crate::auth::{AuthError, Identity};
use crate::unix_now;

/// Refresh token lifetime: 60 days.
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 60 * 24 * 60 * 60;

/// Number of random bytes in a refresh token (hex-encoded to twice as many chars).
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// A persisted refresh token row. Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Identity,
    pub created_at: u64,
    pub updated_at: u64,
    pub expires_at: u64,
    pub revoked_at: Option<u64>,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }
}

/// Failure inside a token store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored row is corrupt: {0}")]
    Corrupt(String),
}

/// Persistence for refresh tokens, keyed by the token string.
///
/// Every method is a single read or write against one row.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Insert a new active token created at `now`. A duplicate token is an
    /// error, not a retry.
    async fn insert(
        &self,
        token: &str,
        user_id: Identity,
        now: u64,
        expires_at: u64,
    ) -> Result<RefreshToken, StoreError>;

    /// Fetch a token by exact match.
    async fn fetch(&self, token: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Stamp `revoked_at` and `updated_at` with `now` unless the token is
    /// already revoked. Returns false when no such token exists.
    async fn mark_revoked(&self, token: &str, now: u64) -> Result<bool, StoreError>;
}

/// Business rules for issuing, resolving and revoking refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenService<S> {
    store: S,
}

impl<S: RefreshTokenStore> RefreshTokenService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create and persist a fresh refresh token for `user_id`.
    pub async fn mint(&self, user_id: Identity) -> Result<String, AuthError> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let now = unix_now();
        self.store
            .insert(&token, user_id, now, now + REFRESH_TOKEN_DURATION_SECS)
            .await?;

        info!(user_id = %user_id, "Refresh token issued");
        Ok(token)
    }

    /// Resolve the owner of a refresh token, rejecting unknown, revoked and
    /// expired tokens. A token that is both revoked and expired reports
    /// `TokenRevoked`.
    pub async fn resolve_identity(&self, token: &str) -> Result<Identity, AuthError> {
        let row = self
            .store
            .fetch(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if row.is_revoked() {
            return Err(AuthError::TokenRevoked);
        }

        if row.is_expired_at(unix_now()) {
            return Err(AuthError::TokenExpired);
        }

        Ok(row.user_id)
    }

    /// Revoke a refresh token. Revoking an already revoked token succeeds.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        if self.store.mark_revoked(token, unix_now()).await? {
            debug!("Refresh token revoked");
            Ok(())
        } else {
            Err(AuthError::TokenNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, TokenStore};
    use crate::password::hash_password;

    async fn setup() -> (Database, RefreshTokenService<TokenStore>, Identity) {
        let db = Database::open(":memory:").await.unwrap();
        let hash = hash_password("password").unwrap();
        let user = db.users().create("alice@example.com", &hash).await.unwrap();
        let service = RefreshTokenService::new(db.tokens());
        (db, service, user.id)
    }

    #[tokio::test]
    async fn test_mint_and_resolve() {
        let (db, service, user_id) = setup().await;

        let token = service.mint(user_id).await.unwrap();
        assert_eq!(token.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(service.resolve_identity(&token).await.unwrap(), user_id);

        let row = db.tokens().fetch(&token).await.unwrap().unwrap();
        assert_eq!(row.updated_at, row.created_at);
        assert_eq!(row.expires_at, row.created_at + REFRESH_TOKEN_DURATION_SECS);
        assert_eq!(row.revoked_at, None);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let (_db, service, user_id) = setup().await;

        let first = service.mint(user_id).await.unwrap();
        let second = service.mint(user_id).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (_db, service, _) = setup().await;
        assert!(matches!(
            service.resolve_identity("deadbeef").await,
            Err(AuthError::TokenNotFound)
        ));
        assert!(matches!(
            service.revoke("deadbeef").await,
            Err(AuthError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (db, service, user_id) = setup().await;
        let token = service.mint(user_id).await.unwrap();

        service.revoke(&token).await.unwrap();
        let first = db.tokens().fetch(&token).await.unwrap().unwrap();

        service.revoke(&token).await.unwrap();
        let second = db.tokens().fetch(&token).await.unwrap().unwrap();

        assert!(first.revoked_at.is_some());
        assert_eq!(first, second, "second revoke must not change the row");
        assert!(matches!(
            service.resolve_identity(&token).await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let (db, service, user_id) = setup().await;
        let token = "a".repeat(64);
        db.tokens()
            .insert(&token, user_id, unix_now() - 10, unix_now() - 1)
            .await
            .unwrap();

        assert!(matches!(
            service.resolve_identity(&token).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_revoked_takes_precedence_over_expired() {
        let (db, service, user_id) = setup().await;
        let token = "b".repeat(64);
        db.tokens()
            .insert(&token, user_id, unix_now() - 10, unix_now() - 1)
            .await
            .unwrap();
        service.revoke(&token).await.unwrap();

        assert!(matches!(
            service.resolve_identity(&token).await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_token_is_reported() {
        let (db, _service, user_id) = setup().await;
        let token = "c".repeat(64);
        let far = unix_now() + REFRESH_TOKEN_DURATION_SECS;

        db.tokens().insert(&token, user_id, unix_now(), far).await.unwrap();
        assert!(db.tokens().insert(&token, user_id, unix_now(), far).await.is_err());
    }
}
