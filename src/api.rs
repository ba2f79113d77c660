//! REST API Server for the finance assistant
//!
//! Exposes the message router via HTTP endpoints
//! Integrates with the browser chat UI

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};

use crate::error::FinBotError;
use crate::router::MessageRouter;

pub const NO_MESSAGE_ERROR: &str = "No message provided";

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ChatRequest {
    /// Non-blank string message, if any.
    fn text(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub router: Arc<MessageRouter>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "advice_configured": state.router.advice_configured(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

/// Every malformed chat request gets the same 400 body; the reason is logged.
fn bad_request(reason: FinBotError) -> (StatusCode, Json<ErrorResponse>) {
    warn!("Rejected chat request: {}", reason);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: NO_MESSAGE_ERROR.to_string(),
        }),
    )
}

async fn chat_handler(
    State(state): State<ApiState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(req) = payload
        .map_err(|rejection| bad_request(FinBotError::BadRequest(rejection.body_text())))?;

    let Some(message) = req.text() else {
        return Err(bad_request(FinBotError::BadRequest(
            "message missing or blank".to_string(),
        )));
    };

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    let reply = async {
        info!(chars = message.len(), "Received chat message");
        state.router.route(message).await
    }
    .instrument(span)
    .await;

    Ok(Json(ChatResponse { response: reply.text }))
}

/// =============================
/// Router
/// =============================

pub fn create_router(router: Arc<MessageRouter>) -> Router {
    let state = ApiState { router };

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(router: Arc<MessageRouter>, port: u16) -> crate::Result<()> {
    let app = create_router(router);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{AdviceFallback, NOT_CONFIGURED_MESSAGE};
    use crate::market::FakeMarket;
    use crate::stock::StockLookup;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let market = FakeMarket {
            fast: Some(3500.0),
            ..Default::default()
        };
        let router = MessageRouter::new(
            StockLookup::new(Arc::new(market)),
            AdviceFallback::disabled(),
        );
        create_router(Arc::new(router))
    }

    async fn post_chat(body: &str) -> (StatusCode, serde_json::Value) {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_returns_response_field() {
        let (status, body) = post_chat(r#"{"message": "What is the price of TCS?"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "The current price of TCS is ₹3500.00.");
    }

    #[tokio::test]
    async fn test_chat_advice_fallthrough() {
        let (status, body) = post_chat(r#"{"message": "price of Dogecoin"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], NOT_CONFIGURED_MESSAGE);
    }

    #[tokio::test]
    async fn test_chat_missing_or_empty_message_is_400() {
        for payload in [
            r#"{"message": ""}"#,
            r#"{"message": "   "}"#,
            r#"{"message": null}"#,
            r#"{"message": 42}"#,
            r#"{}"#,
            "not json",
        ] {
            let (status, body) = post_chat(payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
            assert_eq!(body, serde_json::json!({ "error": "No message provided" }));
        }
    }

    #[tokio::test]
    async fn test_health_reports_advice_state() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["advice_configured"], false);
    }
}
