pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod metrics;
pub mod password;
pub mod refresh;

use api::{create_admin_router, create_api_router};
use auth::AuthBackend;
use axum::Router;
use cli::Platform;
use db::Database;
use jwt::AccessTokenCodec;
use metrics::{Metrics, file_server};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing access tokens
    pub jwt_secret: Vec<u8>,
    /// Shared key the payment partner presents on webhooks
    pub polka_key: String,
    /// Deployment platform
    pub platform: Platform,
    /// Directory served under `/app`
    pub filepath_root: PathBuf,
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let codec = Arc::new(AccessTokenCodec::new(&config.jwt_secret));
    let auth = AuthBackend::new(codec, config.polka_key.as_str());

    let metrics = Metrics::new();

    Router::new()
        .nest_service("/app", file_server(&config.filepath_root, metrics.clone()))
        .nest("/api", create_api_router(config.db.clone(), auth))
        .nest(
            "/admin",
            create_admin_router(config.db.clone(), config.platform, metrics),
        )
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
