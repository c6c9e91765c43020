//! Login and refresh-token endpoints.
//!
//! `/login` exchanges email and password for an access token plus a refresh
//! token. `/refresh` and `/revoke` take the refresh token as a bearer
//! credential.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::{ApiError, ResultExt};
use super::users::UserResponse;
use crate::auth::{AuthBackend, AuthError, bearer_token};
use crate::db::{Database, TokenStore};
use crate::impl_has_auth_backend;
use crate::jwt::DEFAULT_ACCESS_TOKEN_TTL;
use crate::password::verify_password_blocking;
use crate::refresh::RefreshTokenService;

/// State for token endpoints.
#[derive(Clone)]
pub struct TokensState {
    pub db: Database,
    pub auth: AuthBackend,
    pub refresh: RefreshTokenService<TokenStore>,
}

impl_has_auth_backend!(TokensState);

pub fn router(state: TokensState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .with_state(state)
}

/// Access token lifetime for a login request. Anything outside one second to
/// one hour falls back to one hour.
fn access_ttl(requested: Option<u64>) -> Duration {
    match requested {
        Some(secs) if (1..=DEFAULT_ACCESS_TOKEN_TTL.as_secs()).contains(&secs) => {
            Duration::from_secs(secs)
        }
        _ => DEFAULT_ACCESS_TOKEN_TTL,
    }
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    expires_in_seconds: Option<u64>,
}

#[derive(Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    user: UserResponse,
    token: String,
    refresh_token: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    token: String,
}

const LOGIN_FAILED: &str = "Incorrect email or password";

async fn login(
    State(state): State<TokensState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state
        .db
        .users()
        .get_by_email(&req.email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized(LOGIN_FAILED))?;

    match verify_password_blocking(user.hashed_password.clone(), req.password).await {
        Ok(()) => {}
        Err(AuthError::PasswordMismatch) => return Err(ApiError::unauthorized(LOGIN_FAILED)),
        Err(AuthError::MalformedHash) => {
            warn!(user_id = %user.id, "Stored password hash is unusable");
            return Err(ApiError::unauthorized(LOGIN_FAILED));
        }
        Err(e) => return Err(e.into()),
    }

    let token = state
        .auth
        .codec
        .issue(user.id, access_ttl(req.expires_in_seconds))?;
    let refresh_token = state.refresh.mint(user.id).await?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse {
        user: UserResponse::from(user),
        token,
        refresh_token,
    }))
}

/// Issue a new access token for the owner of a live refresh token.
/// The refresh token itself is left unchanged.
async fn refresh(
    State(state): State<TokensState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = bearer_token(&headers)?;
    let user_id = state.refresh.resolve_identity(refresh_token).await?;
    let token = state.auth.codec.issue(user_id, DEFAULT_ACCESS_TOKEN_TTL)?;

    Ok(Json(RefreshResponse { token }))
}

async fn revoke(
    State(state): State<TokensState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = bearer_token(&headers)?;
    state.refresh.revoke(refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
