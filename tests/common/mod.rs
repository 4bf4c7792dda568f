// Shared test doubles for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mindmitra::context::{ConversationTurn, TurnRole};
use mindmitra::emotion::{Emotion, EmotionClassifier, EmotionResult};
use mindmitra::generator::{GenerationParams, ResponseGenerator};
use mindmitra::pipeline::Pipeline;
use mindmitra::providers::{LlmProvider, ProviderError, ProviderRequest, ProviderResponse};
use mindmitra::storage::{HistoryStore, MemoryStore, PersistenceStore, StoreError};

/// Classifier that always returns the same result
pub struct FixedClassifier(pub EmotionResult);

#[async_trait]
impl EmotionClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> EmotionResult {
        self.0
    }
}

/// Provider with a canned outcome that records every request
pub struct ScriptedProvider {
    outcome: Result<String, ProviderError>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn send_message(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map(|text| ProviderResponse {
            model: "scripted".to_string(),
            text,
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted"
    }
}

/// Memory store that can be told to fail individual operations
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_history: bool,
    pub fail_assistant_turn: bool,
    pub fail_mood: bool,
    pub write_delay: Option<Duration>,
}

impl FlakyStore {
    async fn slow_down(&self) {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn unavailable() -> StoreError {
    StoreError::Status {
        status: 503,
        body: "unavailable".to_string(),
    }
}

#[async_trait]
impl HistoryStore for FlakyStore {
    async fn recent_turns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        if self.fail_history {
            return Err(unavailable());
        }
        self.inner.recent_turns(user_id, limit).await
    }
}

#[async_trait]
impl PersistenceStore for FlakyStore {
    async fn save_turn(
        &self,
        user_id: &str,
        role: TurnRole,
        text: &str,
        emotion: Option<Emotion>,
    ) -> Result<(), StoreError> {
        self.slow_down().await;
        if self.fail_assistant_turn && role == TurnRole::Assistant {
            return Err(unavailable());
        }
        self.inner.save_turn(user_id, role, text, emotion).await
    }

    async fn save_mood_sample(
        &self,
        user_id: &str,
        emotion: Emotion,
        confidence: f32,
    ) -> Result<(), StoreError> {
        self.slow_down().await;
        if self.fail_mood {
            return Err(unavailable());
        }
        self.inner.save_mood_sample(user_id, emotion, confidence).await
    }
}

/// Pipeline over `store` with a fixed classifier and `provider`
pub fn pipeline_with<S>(
    emotion: EmotionResult,
    provider: Arc<ScriptedProvider>,
    store: Arc<S>,
    timeout: Duration,
) -> Pipeline
where
    S: HistoryStore + PersistenceStore + 'static,
{
    let generator = ResponseGenerator::new(provider).with_params(GenerationParams {
        timeout,
        ..GenerationParams::default()
    });

    Pipeline::new(
        Arc::new(FixedClassifier(emotion)),
        generator,
        store.clone(),
        store,
    )
}
