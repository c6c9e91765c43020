use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::unix_now;

#[derive(Clone)]
pub struct ChirpStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct Chirp {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(sqlx::FromRow)]
struct ChirpRow {
    id: String,
    user_id: String,
    body: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ChirpRow> for Chirp {
    type Error = sqlx::Error;

    fn try_from(row: ChirpRow) -> Result<Self, Self::Error> {
        let parse = |s: &str| Uuid::parse_str(s).map_err(|e| sqlx::Error::Decode(Box::new(e)));
        Ok(Self {
            id: parse(&row.id)?,
            user_id: parse(&row.user_id)?,
            body: row.body,
            created_at: row.created_at as u64,
            updated_at: row.updated_at as u64,
        })
    }
}

/// Listing order by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl ChirpStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = unix_now();

        sqlx::query(
            "INSERT INTO chirps (id, user_id, body, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(body)
        .bind(now as i64)
        .bind(now as i64)
        .execute(&self.pool)
        .await?;

        Ok(Chirp {
            id,
            user_id,
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// List chirps, optionally restricted to one author.
    /// Ties on `created_at` fall back to insertion order.
    pub async fn list(
        &self,
        author: Option<Uuid>,
        order: SortOrder,
    ) -> Result<Vec<Chirp>, sqlx::Error> {
        let query = match (author.is_some(), order) {
            (false, SortOrder::Asc) => {
                "SELECT id, user_id, body, created_at, updated_at FROM chirps ORDER BY created_at ASC, rowid ASC"
            }
            (false, SortOrder::Desc) => {
                "SELECT id, user_id, body, created_at, updated_at FROM chirps ORDER BY created_at DESC, rowid DESC"
            }
            (true, SortOrder::Asc) => {
                "SELECT id, user_id, body, created_at, updated_at FROM chirps WHERE user_id = ? ORDER BY created_at ASC, rowid ASC"
            }
            (true, SortOrder::Desc) => {
                "SELECT id, user_id, body, created_at, updated_at FROM chirps WHERE user_id = ? ORDER BY created_at DESC, rowid DESC"
            }
        };

        let mut q = sqlx::query_as::<_, ChirpRow>(query);
        if let Some(author) = author {
            q = q.bind(author.to_string());
        }
        let rows = q.fetch_all(&self.pool).await?;

        rows.into_iter().map(Chirp::try_from).collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Chirp>, sqlx::Error> {
        let row: Option<ChirpRow> = sqlx::query_as(
            "SELECT id, user_id, body, created_at, updated_at FROM chirps WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Chirp::try_from).transpose()
    }

    /// Delete a chirp owned by `user_id`. Returns false if nothing matched.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
