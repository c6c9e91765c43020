//! Chirps API.
//!
//! Reading is public. Creating and deleting require an access token.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::error::{ApiError, ResultExt, parse_uuid};
use crate::auth::{Auth, AuthBackend};
use crate::db::{Chirp, Database, SortOrder};
use crate::impl_has_auth_backend;

pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];

/// State for chirp endpoints.
#[derive(Clone)]
pub struct ChirpsState {
    pub db: Database,
    pub auth: AuthBackend,
}

impl_has_auth_backend!(ChirpsState);

pub fn router(state: ChirpsState) -> Router {
    Router::new()
        .route("/", get(list_chirps).post(create_chirp))
        .route("/{chirp_id}", get(get_chirp).delete(delete_chirp))
        .with_state(state)
}

/// Replace profane words with `****`. Matching is case-insensitive and only
/// whole space-separated words are replaced.
fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if PROFANE_WORDS.contains(&lower.as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Deserialize)]
struct CreateChirpRequest {
    #[serde(default)]
    body: String,
}

#[derive(Deserialize)]
struct ListQuery {
    author_id: Option<String>,
    #[serde(default)]
    sort: SortOrder,
}

#[derive(Serialize)]
struct ChirpResponse {
    id: Uuid,
    user_id: Uuid,
    body: String,
    created_at: u64,
    updated_at: u64,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            user_id: chirp.user_id,
            body: chirp.body,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
        }
    }
}

async fn create_chirp(
    State(state): State<ChirpsState>,
    Auth(user_id): Auth,
    Json(req): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::bad_request("Chirp is too long"));
    }

    let chirp = state
        .db
        .chirps()
        .create(user_id, &clean_body(&req.body))
        .await
        .db_err("Failed to create chirp")?;

    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

async fn list_chirps(
    State(state): State<ChirpsState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let author = query
        .author_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| parse_uuid(s, "author_id"))
        .transpose()?;

    let chirps = state
        .db
        .chirps()
        .list(author, query.sort)
        .await
        .db_err("Failed to list chirps")?;

    let chirps: Vec<ChirpResponse> = chirps.into_iter().map(ChirpResponse::from).collect();
    Ok(Json(chirps))
}

async fn get_chirp(
    State(state): State<ChirpsState>,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp_id = parse_uuid(&chirp_id, "chirp ID")?;

    let chirp = state
        .db
        .chirps()
        .get(chirp_id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    Ok(Json(ChirpResponse::from(chirp)))
}

async fn delete_chirp(
    State(state): State<ChirpsState>,
    Auth(user_id): Auth,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp_id = parse_uuid(&chirp_id, "chirp ID")?;

    let chirp = state
        .db
        .chirps()
        .get(chirp_id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    if chirp.user_id != user_id {
        return Err(ApiError::forbidden("You can only delete your own chirps"));
    }

    let deleted = state
        .db
        .chirps()
        .delete(chirp_id, user_id)
        .await
        .db_err("Failed to delete chirp")?;

    if !deleted {
        return Err(ApiError::not_found("Chirp not found"));
    }

    info!(chirp_id = %chirp_id, user_id = %user_id, "Chirp deleted");
    Ok(StatusCode::NO_CONTENT)
}
