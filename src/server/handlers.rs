// HTTP request handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::AppState;
use crate::analytics::{self, MoodSummary, DEFAULT_LOOKBACK_DAYS};
use crate::emotion::Emotion;
use crate::pipeline::{PipelineResult, Utterance, ValidationError};
use crate::storage::StoreError;

const SERVICE_NAME: &str = "MindMitra API";
const MAX_LOOKBACK_DAYS: u32 = 365;
const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/", get(root))
        .route("/chat", post(handle_chat))
        .route("/mood/:user_id", get(handle_mood))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
}

/// A panicking handler answers like any other internal error
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(anyhow::anyhow!("Handler panicked: {}", detail)).into_response()
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Request body for POST /chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

/// Response body for POST /chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub emotion: Emotion,
    pub confidence: f32,
    pub crisis: bool,
}

impl From<PipelineResult> for ChatResponse {
    fn from(result: PipelineResult) -> Self {
        Self {
            reply: result.reply,
            emotion: result.emotion.label,
            confidence: result.emotion.confidence,
            crisis: result.is_crisis,
        }
    }
}

/// Handle POST /chat - Main chat endpoint
async fn handle_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let utterance = Utterance::new(&request.user_id, &request.message)?;

    // Tied to this request: a client that goes away takes the remote calls with it
    let result = state.pipeline.process(&utterance).await;
    Ok(Json(result.into()))
}

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    #[serde(default)]
    pub days: Option<u32>,
}

/// Handle GET /mood/:user_id - Mood distribution and timeline
async fn handle_mood(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<MoodQuery>,
) -> Result<Json<MoodSummary>, AppError> {
    let days = query
        .days
        .unwrap_or(DEFAULT_LOOKBACK_DAYS)
        .clamp(1, MAX_LOOKBACK_DAYS);

    let summary = analytics::summarize(state.moods.as_ref(), &user_id, days).await?;
    Ok(Json(summary))
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Handle GET /health - Liveness probe
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to MindMitra API 🧠💙",
        "health": "/health",
    }))
}

/// Handle GET /metrics - Prometheus metrics endpoint
pub async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Application error wrapper for proper HTTP error responses
#[derive(Debug)]
pub enum AppError {
    /// Client sent something we will not process
    BadRequest(String),
    /// Anything else; details are logged, never returned
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(detail) => {
                tracing::debug!(detail = %detail, "Rejected request");
                let body = serde_json::json!({ "detail": detail });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::Internal(error) => {
                tracing::error!(error = %error, "Request failed");
                let body = serde_json::json!({ "detail": GENERIC_ERROR });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.into())
    }
}
