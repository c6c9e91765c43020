//! Admin endpoints.
//!
//! The metrics page is public. Reset only works on the dev platform.

use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Serialize;
use tracing::warn;

use super::error::{ApiError, ResultExt};
use crate::cli::Platform;
use crate::db::Database;
use crate::metrics::Metrics;

/// State for admin endpoints.
#[derive(Clone)]
pub struct AdminState {
    pub db: Database,
    pub platform: Platform,
    pub metrics: Metrics,
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/reset", post(reset))
        .with_state(state)
}

async fn metrics(State(state): State<AdminState>) -> Html<String> {
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        state.metrics.hits()
    ))
}

#[derive(Serialize)]
struct ResetResponse {
    deleted_users: u64,
}

/// Delete all users, along with their chirps and refresh tokens, and zero
/// the visit counter.
async fn reset(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    if state.platform != Platform::Dev {
        return Err(ApiError::forbidden("Reset is only allowed in dev environment"));
    }

    let deleted_users = state
        .db
        .users()
        .delete_all()
        .await
        .db_err("Failed to reset database")?;
    state.metrics.reset();

    warn!(deleted_users, "Database reset");
    Ok(Json(ResetResponse { deleted_users }))
}
