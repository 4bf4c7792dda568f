// Emotion classification through the chat-completion model
//
// The model only returns a label, never a probability, so a recognised label
// is reported with a fixed confidence.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::types::{Emotion, EmotionResult};
use super::EmotionClassifier;
use crate::providers::{ChatMessage, LlmProvider, ProviderRequest};

/// Confidence attached to any label the model returns from the closed set
pub const REMOTE_CONFIDENCE: f32 = 0.9;

/// Confidence used when the model answers with something outside the set
pub const UNKNOWN_LABEL_CONFIDENCE: f32 = 0.5;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_TOKENS: u32 = 10;
const TEMPERATURE: f32 = 0.1;
const REQUEST_TITLE: &str = "MindMitra Emotion Classifier";

/// Classifier backed by a remote chat-completion call
pub struct RemoteEmotionClassifier {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl RemoteEmotionClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_prompt(text: &str) -> String {
        let labels = Emotion::ALL
            .iter()
            .map(|e| e.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Classify the emotion of this text into exactly one of these labels: {}.\n\
             Text: \"{}\"\n\
             Reply ONLY with the label.",
            labels, text
        )
    }

    fn build_request(&self, text: &str) -> ProviderRequest {
        ProviderRequest::new(vec![ChatMessage::user(Self::build_prompt(text))])
            .with_max_tokens(MAX_TOKENS)
            .with_temperature(TEMPERATURE)
            .with_timeout(self.timeout)
            .with_title(REQUEST_TITLE)
    }
}

/// Turn the model's free-form answer into a result from the closed set
///
/// The answer is lowercased and stripped of everything but ASCII letters, so
/// "Sadness." and " sadness\n" both parse.
pub(crate) fn parse_label(raw: &str) -> EmotionResult {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect();

    match cleaned.parse::<Emotion>() {
        Ok(label) => EmotionResult::new(label, REMOTE_CONFIDENCE),
        Err(_) => {
            tracing::debug!(answer = raw, "Classifier answered outside the label set");
            EmotionResult::new(Emotion::Neutral, UNKNOWN_LABEL_CONFIDENCE)
        }
    }
}

#[async_trait]
impl EmotionClassifier for RemoteEmotionClassifier {
    async fn classify(&self, text: &str) -> EmotionResult {
        let request = self.build_request(text);

        // The provider applies the per-request timeout too; this bounds
        // providers that ignore it.
        let outcome = tokio::time::timeout(self.timeout, self.provider.send_message(&request)).await;

        match outcome {
            Ok(Ok(response)) => parse_label(&response.text),
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    kind = e.kind(),
                    error = %e,
                    "Emotion classification failed, using neutral fallback"
                );
                EmotionResult::fallback()
            }
            Err(_) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Emotion classification timed out, using neutral fallback"
                );
                EmotionResult::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_accepts_noisy_answers() {
        assert_eq!(parse_label("Sadness.").label, Emotion::Sadness);
        assert_eq!(parse_label("  fear\n").label, Emotion::Fear);
        assert_eq!(parse_label("**joy**").confidence, REMOTE_CONFIDENCE);
    }

    #[test]
    fn test_parse_label_coerces_unknown_to_neutral() {
        let result = parse_label("melancholy");
        assert_eq!(result.label, Emotion::Neutral);
        assert_eq!(result.confidence, UNKNOWN_LABEL_CONFIDENCE);

        let result = parse_label("");
        assert_eq!(result.label, Emotion::Neutral);
    }

    #[test]
    fn test_prompt_lists_every_label() {
        let prompt = RemoteEmotionClassifier::build_prompt("hello there");
        assert!(prompt.contains("anger, disgust, fear, joy, neutral, sadness, surprise."));
        assert!(prompt.contains("Text: \"hello there\""));
        assert!(prompt.ends_with("Reply ONLY with the label."));
    }
}
