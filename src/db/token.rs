//! SQLite-backed refresh token storage.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::refresh::{RefreshToken, RefreshTokenStore, StoreError};

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: String,
    created_at: i64,
    updated_at: i64,
    expires_at: i64,
    revoked_at: Option<i64>,
}

impl TryFrom<RefreshTokenRow> for RefreshToken {
    type Error = StoreError;

    fn try_from(row: RefreshTokenRow) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&row.user_id)
            .map_err(|e| StoreError::Corrupt(format!("user_id {}: {}", row.user_id, e)))?;
        Ok(Self {
            token: row.token,
            user_id,
            created_at: row.created_at as u64,
            updated_at: row.updated_at as u64,
            expires_at: row.expires_at as u64,
            revoked_at: row.revoked_at.map(|t| t as u64),
        })
    }
}

/// Store for refresh token rows.
#[derive(Clone)]
pub struct TokenStore {
    pool: SqlitePool,
}

impl TokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for TokenStore {
    async fn insert(
        &self,
        token: &str,
        user_id: Uuid,
        now: u64,
        expires_at: u64,
    ) -> Result<RefreshToken, StoreError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at) VALUES (?, ?, ?, ?, ?, NULL)",
        )
        .bind(token)
        .bind(user_id.to_string())
        .bind(now as i64)
        .bind(now as i64)
        .bind(expires_at as i64)
        .execute(&self.pool)
        .await?;

        Ok(RefreshToken {
            token: token.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        })
    }

    async fn fetch(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT token, user_id, created_at, updated_at, expires_at, revoked_at FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RefreshToken::try_from).transpose()
    }

    async fn mark_revoked(&self, token: &str, now: u64) -> Result<bool, StoreError> {
        // SET expressions all see the pre-update row, so an existing revoked_at
        // keeps both columns unchanged.
        let result = sqlx::query(
            "UPDATE refresh_tokens
             SET updated_at = CASE WHEN revoked_at IS NULL THEN ?1 ELSE updated_at END,
                 revoked_at = COALESCE(revoked_at, ?1)
             WHERE token = ?2",
        )
        .bind(now as i64)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
