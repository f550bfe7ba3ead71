//! HTTP backend
//!
//! Two JSON endpoints over the same engine the CLI uses, plus a health check.
//!
//! # Routes
//! - `POST /api/calculate`: BirthForm -> FourPillars
//! - `POST /api/analysis`: FourPillars -> `{section: text}`
//! - `GET /api/health`: version and content state
//!
//! # Usage
//! ```bash
//! saju --serve 127.0.0.1:3000
//! ```

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use crate::core::{BirthForm, FourPillars, Narrative, Result, SajuEngine, SajuError};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SajuEngine>,
}

impl AppState {
    pub fn new(engine: SajuEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error body: `{"error": message}`
#[derive(Debug)]
pub enum ApiError {
    /// Malformed JSON or a validation failure
    BadRequest(String),
    Internal(String),
}

impl From<SajuError> for ApiError {
    fn from(err: SajuError) -> Self {
        if err.is_validation() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn calculate(
    State(state): State<AppState>,
    body: std::result::Result<Json<BirthForm>, JsonRejection>,
) -> std::result::Result<Json<FourPillars>, ApiError> {
    let Json(form) = body?;
    let pillars = state.engine.pillars_for(&form).map_err(|e| {
        tracing::debug!(error = %e, "Rejected submission");
        ApiError::from(e)
    })?;
    Ok(Json(pillars))
}

pub async fn analysis(
    State(state): State<AppState>,
    body: std::result::Result<Json<FourPillars>, JsonRejection>,
) -> std::result::Result<Json<Narrative>, ApiError> {
    let Json(pillars) = body?;
    Ok(Json(state.engine.analyze(&pillars)))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "version": crate::VERSION,
        "content": state.engine.content().state().label(),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/calculate", post(calculate))
        .route("/api/analysis", post(analysis))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(addr: &str, engine: SajuEngine) -> Result<()> {
    let app = router(AppState::new(engine));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| SajuError::Io(e).with_context(format!("binding {}", addr)))?;
    tracing::info!(address = %addr, "Server bound");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContentStore, SajuConfig};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn app() -> Router {
        let engine = SajuEngine::new(SajuConfig::default(), ContentStore::embedded().unwrap());
        router(AppState::new(engine))
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_calculate_returns_pillars() {
        let (status, body) = post_json(
            app(),
            "/api/calculate",
            r#"{"name":"a","birthYear":1990,"birthMonth":5,"birthDay":15,"birthHour":14,"isLunar":false,"gender":"male"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["year"]["stem"], "庚");
        assert_eq!(body["day"]["branch"], "巳");
        assert_eq!(body["hour"]["element"], "金");
    }

    #[tokio::test]
    async fn test_calculate_rejects_bad_hour() {
        let (status, body) = post_json(
            app(),
            "/api/calculate",
            r#"{"birthYear":1990,"birthMonth":5,"birthDay":15,"birthHour":24}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("23"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (status, body) = post_json(app(), "/api/calculate", "{ nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_analysis_returns_sections() {
        let (status, body) = post_json(
            app(),
            "/api/analysis",
            r#"{"year":{"stem":"庚","branch":"午"},"month":{"stem":"庚","branch":"午"},"day":{"stem":"乙","branch":"巳"},"hour":{"stem":"辛","branch":"未"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["basic_info"].as_str().unwrap().contains("금(金)"));
        assert!(body["patterns"].as_str().unwrap().contains("천간합"));
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["content"], "ready");
    }
}
