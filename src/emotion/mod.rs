// Emotion classification
//
// Maps an utterance to one dominant label from a closed set. Backends never
// return errors: anything that goes wrong collapses to `EmotionResult::fallback()`.

use async_trait::async_trait;

mod remote;
mod types;

pub use remote::{RemoteEmotionClassifier, REMOTE_CONFIDENCE, UNKNOWN_LABEL_CONFIDENCE};
pub use types::{Emotion, EmotionResult, UnknownEmotion};

/// Classifies the emotional tone of a single utterance
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classify non-empty, trimmed text
    ///
    /// Fails closed: backend errors produce `EmotionResult::fallback()`.
    async fn classify(&self, text: &str) -> EmotionResult;
}
