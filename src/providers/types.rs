// Request/response types shared by chat-completion providers

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role field of a chat-completion message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One `{role, content}` entry sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Provider-agnostic completion request
///
/// Decoding parameters are optional; a provider only forwards the ones that
/// are set. `timeout` bounds the whole HTTP exchange.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    pub messages: Vec<ChatMessage>,

    /// Model name (empty means "provider default")
    pub model: String,

    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,

    #[serde(skip)]
    pub timeout: Option<Duration>,

    /// Value for the `X-Title` attribution header
    #[serde(skip)]
    pub title: Option<String>,
}

impl ProviderRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: String::new(),
            max_tokens: 500,
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            timeout: None,
            title: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Completed generation
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    /// Model that produced the text, as reported by the provider
    pub model: String,
    /// Raw (untrimmed) text of the first choice
    pub text: String,
}

/// Failure classes a provider distinguishes
///
/// Callers map each variant to a different recovery; do not collapse them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Short, stable name for logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Timeout => "timeout",
            ProviderError::Status { .. } => "status",
            ProviderError::Malformed(_) => "malformed",
            ProviderError::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}
