// Integration tests for HTTP server

mod common;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::{pipeline_with, ScriptedProvider};
use mindmitra::crisis::DEFAULT_SUPPORT_MESSAGE;
use mindmitra::emotion::{Emotion, EmotionClassifier, EmotionResult};
use mindmitra::generator::ResponseGenerator;
use mindmitra::metrics::PipelineMetrics;
use mindmitra::pipeline::Pipeline;
use mindmitra::server::{create_router, AppState, ChatResponse};
use mindmitra::storage::{MemoryStore, MoodSample};

fn app_for(pipeline: Pipeline, store: Arc<MemoryStore>) -> (axum::Router, PipelineMetrics) {
    let metrics = PipelineMetrics::new().unwrap();
    let state = AppState {
        pipeline: Arc::new(pipeline.with_metrics(metrics.clone())),
        moods: store,
        metrics: metrics.clone(),
        cors_origins: vec!["http://localhost:3000".to_string()],
    };
    (create_router(Arc::new(state)), metrics)
}

fn app_with(store: Arc<MemoryStore>, emotion: EmotionResult, reply: &str) -> (axum::Router, PipelineMetrics) {
    let pipeline = pipeline_with(
        emotion,
        Arc::new(ScriptedProvider::replying(reply)),
        store.clone(),
        std::time::Duration::from_secs(5),
    );
    app_for(pipeline, store)
}

fn app() -> axum::Router {
    app_with(
        Arc::new(MemoryStore::new()),
        EmotionResult::new(Emotion::Joy, 0.95),
        "Glad to hear it!",
    )
    .0
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "MindMitra API");
}

#[tokio::test]
async fn test_root_welcome() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["health"], "/health");
}

#[tokio::test]
async fn test_chat_success() {
    let response = app()
        .oneshot(chat_request(json!({ "user_id": "u1", "message": "I had a great day!" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ChatResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(
        body,
        ChatResponse {
            reply: "Glad to hear it!".to_string(),
            emotion: Emotion::Joy,
            confidence: 0.95,
            crisis: false,
        }
    );
}

#[tokio::test]
async fn test_chat_crisis_response() {
    let (app, metrics) = app_with(
        Arc::new(MemoryStore::new()),
        EmotionResult::new(Emotion::Sadness, 0.6),
        "I'm listening.",
    );

    let response = app
        .oneshot(chat_request(json!({ "user_id": "u1", "message": "I feel like I can't go on" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["crisis"], true);
    assert!(body["reply"].as_str().unwrap().ends_with(DEFAULT_SUPPORT_MESSAGE));
    assert_eq!(metrics.crisis_count("lexical"), 1);
}

#[tokio::test]
async fn test_chat_disconnect_stores_nothing() {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(
        ScriptedProvider::replying("too late").with_delay(std::time::Duration::from_millis(300)),
    );
    let pipeline = pipeline_with(
        EmotionResult::new(Emotion::Neutral, 0.9),
        provider.clone(),
        store.clone(),
        std::time::Duration::from_secs(5),
    );
    let (app, _) = app_for(pipeline, store.clone());

    // Client gives up while the reply is still being generated
    let request = app.oneshot(chat_request(json!({ "user_id": "u1", "message": "hello" })));
    let outcome = tokio::time::timeout(std::time::Duration::from_millis(50), request).await;
    assert!(outcome.is_err());
    assert_eq!(provider.requests().len(), 1);

    tokio::time::sleep(std::time::Duration::from_millis(600)).await;
    assert!(store.turns("u1").is_empty());
    assert!(store.mood_samples("u1").is_empty());
}

struct PanickingClassifier;

#[async_trait]
impl EmotionClassifier for PanickingClassifier {
    async fn classify(&self, _text: &str) -> EmotionResult {
        panic!("classifier exploded")
    }
}

#[tokio::test]
async fn test_chat_panic_becomes_internal_error() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(
        Arc::new(PanickingClassifier),
        ResponseGenerator::new(Arc::new(ScriptedProvider::replying("unused"))),
        store.clone(),
        store.clone(),
    );
    let (app, _) = app_for(pipeline, store.clone());

    let response = app
        .oneshot(chat_request(json!({ "user_id": "u1", "message": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Something went wrong. Please try again.");
    assert!(store.turns("u1").is_empty());
}

#[tokio::test]
async fn test_chat_rejects_blank_message() {
    let response = app()
        .oneshot(chat_request(json!({ "user_id": "u1", "message": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Message cannot be empty");
}

#[tokio::test]
async fn test_chat_rejects_oversized_message() {
    let response = app()
        .oneshot(chat_request(json!({ "user_id": "u1", "message": "a".repeat(2001) })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_rejects_missing_fields() {
    let response = app()
        .oneshot(chat_request(json!({ "message": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_mood_summary() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    for (emotion, hours_ago) in [
        (Emotion::Sadness, 30),
        (Emotion::Joy, 20),
        (Emotion::Sadness, 10),
    ] {
        store.insert_mood_sample(
            "u1",
            MoodSample {
                emotion,
                confidence: 0.9,
                created_at: now - Duration::hours(hours_ago),
            },
        );
    }
    // Outside the default 30 day window
    store.insert_mood_sample(
        "u1",
        MoodSample {
            emotion: Emotion::Anger,
            confidence: 0.9,
            created_at: now - Duration::days(45),
        },
    );

    let (app, _) = app_with(store, EmotionResult::fallback(), "ok");
    let response = app
        .oneshot(Request::get("/mood/u1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_entries"], 3);
    assert_eq!(body["distribution"], json!({ "sadness": 2, "joy": 1 }));
    assert_eq!(body["timeline"].as_array().unwrap().len(), 3);
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_mood_empty_history() {
    let response = app()
        .oneshot(Request::get("/mood/nobody?days=7").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_entries"], 0);
    assert_eq!(body["distribution"], json!({}));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, metrics) = app_with(
        Arc::new(MemoryStore::new()),
        EmotionResult::new(Emotion::Neutral, 0.9),
        "ok",
    );
    metrics.record_request();

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("mindmitra_chat_requests_total 1"));
}
