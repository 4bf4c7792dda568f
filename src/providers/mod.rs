// Chat-completion provider abstraction
//
// The pipeline talks to the remote model only through `LlmProvider`, so the
// OpenRouter client can be swapped for a test double or another
// OpenAI-compatible endpoint.

use async_trait::async_trait;

pub mod openrouter;
pub mod types;

pub use openrouter::OpenRouterProvider;
pub use types::{ChatMessage, ChatRole, ProviderError, ProviderRequest, ProviderResponse};

/// Trait for chat-completion providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a request and wait for the complete response
    ///
    /// Implementations must report timeouts, non-success statuses and
    /// undecodable bodies as distinct `ProviderError` variants.
    async fn send_message(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, ProviderError>;

    /// Provider name for logging (e.g., "openrouter")
    fn name(&self) -> &str;

    /// Model used when the request leaves `model` empty
    fn default_model(&self) -> &str;
}
