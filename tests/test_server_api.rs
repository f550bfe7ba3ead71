//! HTTP API tests (feature `server`)

#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use saju::server::{router, AppState};
use saju::{ContentStore, SajuConfig, SajuEngine};
use serde_json::Value;
use tower::util::ServiceExt;

fn app(content: ContentStore) -> axum::Router {
    router(AppState::new(SajuEngine::new(SajuConfig::default(), content)))
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_calculate_then_analyze() {
    let store = ContentStore::embedded().unwrap();

    let (status, pillars) = send(
        app(store.clone()),
        post(
            "/api/calculate",
            r#"{"name":"홍길동","birthYear":"1990","birthMonth":"5","birthDay":"15","birthHour":"14","isLunar":false,"gender":"남"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pillars["day"]["stem"], "乙");

    let (status, narrative) = send(app(store), post("/api/analysis", &pillars.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(narrative["personality"].as_str().unwrap().contains("결실과 정의"));
    assert!(narrative["longevity"].is_string());
}

#[tokio::test]
async fn test_analysis_without_content_uses_placeholder() {
    let mut store = ContentStore::new();
    store.begin_loading();
    let (status, narrative) = send(
        app(store),
        post(
            "/api/analysis",
            r#"{"year":{"stem":"甲","branch":"子"},"month":{"stem":"丙","branch":"寅"},"day":{"stem":"己","branch":"亥"},"hour":{"stem":"甲","branch":"子"}}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(narrative["career"], "패턴 데이터를 불러오는 중입니다...");
}

#[tokio::test]
async fn test_invalid_date_is_400() {
    let (status, body) = send(
        app(ContentStore::new()),
        post(
            "/api/calculate",
            r#"{"birthYear":2023,"birthMonth":2,"birthDay":29,"birthHour":0}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid date: 2023-02-29");
}

#[tokio::test]
async fn test_health_reports_loading_state() {
    let mut store = ContentStore::new();
    store.begin_loading();
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(store), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "loading");
    assert_eq!(body["version"], saju::VERSION);
}
