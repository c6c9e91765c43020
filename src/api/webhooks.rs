//! Payment partner webhooks.
//!
//! Authenticated with the partner API key, not with access tokens.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{ApiError, ResultExt};
use crate::auth::{AuthBackend, PartnerAuth};
use crate::db::Database;
use crate::impl_has_auth_backend;

const USER_UPGRADED: &str = "user.upgraded";

/// State for webhook endpoints.
#[derive(Clone)]
pub struct WebhooksState {
    pub db: Database,
    pub auth: AuthBackend,
}

impl_has_auth_backend!(WebhooksState);

pub fn router(state: WebhooksState) -> Router {
    Router::new()
        .route("/webhooks", post(polka_webhook))
        .with_state(state)
}

#[derive(Deserialize)]
struct WebhookData {
    user_id: Uuid,
}

#[derive(Deserialize)]
struct WebhookEvent {
    event: String,
    data: WebhookData,
}

/// Unrecognized events are acknowledged and ignored.
async fn polka_webhook(
    State(state): State<WebhooksState>,
    _partner: PartnerAuth,
    Json(event): Json<WebhookEvent>,
) -> Result<impl IntoResponse, ApiError> {
    if event.event != USER_UPGRADED {
        debug!(event = %event.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let upgraded = state
        .db
        .users()
        .upgrade_to_red(event.data.user_id)
        .await
        .db_err("Failed to upgrade user")?;

    if !upgraded {
        return Err(ApiError::not_found("User not found"));
    }

    info!(user_id = %event.data.user_id, "User upgraded to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
