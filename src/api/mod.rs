mod admin;
mod chirps;
mod error;
mod tokens;
mod users;
mod webhooks;

use axum::{Router, routing::get};

use crate::auth::AuthBackend;
use crate::cli::Platform;
use crate::db::Database;
use crate::metrics::Metrics;
use crate::refresh::RefreshTokenService;

pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(db: Database, auth: AuthBackend) -> Router {
    let tokens_state = tokens::TokensState {
        db: db.clone(),
        auth: auth.clone(),
        refresh: RefreshTokenService::new(db.tokens()),
    };

    let chirps_state = chirps::ChirpsState {
        db: db.clone(),
        auth: auth.clone(),
    };

    let webhooks_state = webhooks::WebhooksState {
        db: db.clone(),
        auth: auth.clone(),
    };

    let users_state = users::UsersState { db, auth };

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/users", users::router(users_state))
        .nest("/chirps", chirps::router(chirps_state))
        .nest("/polka", webhooks::router(webhooks_state))
        .merge(tokens::router(tokens_state))
}

/// Create the admin router.
pub fn create_admin_router(db: Database, platform: Platform, metrics: Metrics) -> Router {
    admin::router(admin::AdminState {
        db,
        platform,
        metrics,
    })
}

async fn healthz() -> &'static str {
    "OK"
}
