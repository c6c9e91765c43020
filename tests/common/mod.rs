//! Shared helpers for API integration tests.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chirper::{ServerConfig, cli::Platform, create_app, db::Database};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough";
pub const TEST_POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const TEST_INDEX_HTML: &str = "<html><body><h1>Welcome to Chirpy</h1></body></html>";

/// Fresh directory holding an `index.html`, served under `/app`.
fn static_root() -> std::path::PathBuf {
    let root = std::env::temp_dir().join(format!("chirper-app-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("Failed to create static root");
    std::fs::write(root.join("index.html"), TEST_INDEX_HTML).expect("Failed to write index.html");
    root
}

pub async fn create_test_app_on(platform: Platform) -> (Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        polka_key: TEST_POLKA_KEY.to_string(),
        platform,
        filepath_root: static_root(),
    };
    (create_app(&config), db)
}

pub async fn create_test_app() -> Router {
    create_test_app_on(Platform::Prod).await.0
}

/// Build a request with an optional `Authorization` header and JSON body.
pub fn request(method: &str, uri: &str, authorization: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Send a request and decode the JSON response body. Empty bodies decode to `Value::Null`.
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    (status, json)
}

pub async fn register(app: &Router, email: &str, password: &str) -> Value {
    let (status, json) = send(
        app,
        request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", json);
    json
}

pub async fn login(app: &Router, email: &str, password: &str, expires_in_seconds: Option<u64>) -> Value {
    let mut body = json!({ "email": email, "password": password });
    if let Some(secs) = expires_in_seconds {
        body["expires_in_seconds"] = json!(secs);
    }
    let (status, json) = send(app, request("POST", "/api/login", None, Some(body))).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", json);
    json
}

/// Register and log in, returning `(user_id, access_token, refresh_token)`.
pub async fn signup(app: &Router, email: &str) -> (String, String, String) {
    register(app, email, "04234").await;
    let json = login(app, email, "04234", None).await;
    (
        json["id"].as_str().unwrap().to_string(),
        json["token"].as_str().unwrap().to_string(),
        json["refresh_token"].as_str().unwrap().to_string(),
    )
}
