// Response generation
//
// Builds the prompt, makes a single timeout-bounded call to the provider and
// turns every failure into a fallback reply. Nothing here returns an error to
// the caller.

use std::sync::Arc;
use std::time::Duration;

mod fallback;
mod prompt;

pub use fallback::{GenerationFailure, STATUS_FALLBACK, TIMEOUT_FALLBACK, UNEXPECTED_FALLBACK};
pub use prompt::{build_messages, user_turn, CRISIS_NOTE, SYSTEM_PROMPT};

use crate::context::ConversationTurn;
use crate::crisis::CrisisVerdict;
use crate::providers::{LlmProvider, ProviderRequest};

const REQUEST_TITLE: &str = "MindMitra AI Companion";

/// Decoding parameters and time limit for a generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub timeout: Duration,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 500,
            temperature: 0.7,
            top_p: 0.9,
            frequency_penalty: 0.3,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Reply plus the failure that produced it, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub reply: String,
    pub failure: Option<GenerationFailure>,
}

pub struct ResponseGenerator {
    provider: Arc<dyn LlmProvider>,
    params: GenerationParams,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    fn build_request(
        &self,
        user_text: &str,
        context: &[ConversationTurn],
        crisis: &CrisisVerdict,
    ) -> ProviderRequest {
        ProviderRequest::new(build_messages(user_text, context, crisis))
            .with_model(self.params.model.clone())
            .with_max_tokens(self.params.max_tokens)
            .with_temperature(self.params.temperature)
            .with_top_p(self.params.top_p)
            .with_frequency_penalty(self.params.frequency_penalty)
            .with_timeout(self.params.timeout)
            .with_title(REQUEST_TITLE)
    }

    /// Single attempt, typed result
    pub async fn try_generate(
        &self,
        user_text: &str,
        context: &[ConversationTurn],
        crisis: &CrisisVerdict,
    ) -> Result<String, GenerationFailure> {
        let request = self.build_request(user_text, context, crisis);

        let response = tokio::time::timeout(self.params.timeout, self.provider.send_message(&request))
            .await
            .map_err(|_| GenerationFailure::Timeout)??;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(GenerationFailure::Unexpected {
                reason: "model returned empty text".to_string(),
            });
        }

        match (crisis.is_crisis, crisis.support_message.as_deref()) {
            (true, Some(support)) => Ok(format!("{}\n\n{}", text, support)),
            _ => Ok(text.to_string()),
        }
    }

    /// Generate a reply, substituting the fallback for the failure kind
    pub async fn respond(
        &self,
        user_text: &str,
        context: &[ConversationTurn],
        crisis: &CrisisVerdict,
    ) -> Generated {
        match self.try_generate(user_text, context, crisis).await {
            Ok(reply) => Generated {
                reply,
                failure: None,
            },
            Err(failure) => {
                match &failure {
                    GenerationFailure::Unexpected { reason } => tracing::error!(
                        provider = self.provider.name(),
                        reason = %reason,
                        "Unexpected error in generation call"
                    ),
                    other => tracing::warn!(
                        provider = self.provider.name(),
                        kind = other.kind(),
                        error = %other,
                        "Generation failed, using fallback reply"
                    ),
                }
                Generated {
                    reply: failure.fallback_text().to_string(),
                    failure: Some(failure),
                }
            }
        }
    }

    /// Reply text only
    pub async fn generate(
        &self,
        user_text: &str,
        context: &[ConversationTurn],
        crisis: &CrisisVerdict,
    ) -> String {
        self.respond(user_text, context, crisis).await.reply
    }
}
