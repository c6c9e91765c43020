mod common;

use axum::http::StatusCode;
use chirper::cli::Platform;
use common::*;
use serde_json::Value;

fn metrics_page(page: &Value) -> String {
    page.as_str().expect("metrics page should be HTML").to_string()
}

#[tokio::test]
async fn test_app_serves_static_files() {
    let app = create_test_app().await;

    let (status, body) = send(&app, request("GET", "/app/index.html", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String(TEST_INDEX_HTML.to_string()));

    let (status, _) = send(&app, request("GET", "/app/missing.txt", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_count_app_hits() {
    let app = create_test_app().await;

    let (status, page) = send(&app, request("GET", "/admin/metrics", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(metrics_page(&page).contains("Chirpy has been visited 0 times!"));

    for _ in 0..3 {
        send(&app, request("GET", "/app/index.html", None, None)).await;
    }
    // Other routes do not count.
    send(&app, request("GET", "/api/healthz", None, None)).await;

    let (_, page) = send(&app, request("GET", "/admin/metrics", None, None)).await;
    assert!(metrics_page(&page).contains("Chirpy has been visited 3 times!"));
}

#[tokio::test]
async fn test_reset_zeroes_hits_in_dev() {
    let (app, _db) = create_test_app_on(Platform::Dev).await;

    send(&app, request("GET", "/app/index.html", None, None)).await;
    send(&app, request("GET", "/app/index.html", None, None)).await;

    let (_, page) = send(&app, request("GET", "/admin/metrics", None, None)).await;
    assert!(metrics_page(&page).contains("visited 2 times!"));

    let (status, _) = send(&app, request("POST", "/admin/reset", None, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = send(&app, request("GET", "/admin/metrics", None, None)).await;
    assert!(metrics_page(&page).contains("visited 0 times!"));
}

#[tokio::test]
async fn test_reset_outside_dev_keeps_hits() {
    let app = create_test_app().await;
    send(&app, request("GET", "/app/index.html", None, None)).await;

    let (status, _) = send(&app, request("POST", "/admin/reset", None, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, page) = send(&app, request("GET", "/admin/metrics", None, None)).await;
    assert!(metrics_page(&page).contains("visited 1 times!"));
}
