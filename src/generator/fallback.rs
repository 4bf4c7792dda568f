// Fallback ladder: one user-safe reply per generation failure kind

use crate::providers::ProviderError;

pub const TIMEOUT_FALLBACK: &str = "I'm sorry, I'm taking a moment to gather my thoughts. \
Could you please try sending your message again? 💙";

pub const STATUS_FALLBACK: &str = "I'm having a little trouble right now, but I'm here for you. \
Please try again in a moment. 💙";

pub const UNEXPECTED_FALLBACK: &str = "Something went wrong on my side, but I'm still here with you. \
Please try sending that again in a little while. 💙";

/// Why generation did not produce a reply
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationFailure {
    #[error("generation timed out")]
    Timeout,

    #[error("generation backend returned status {status}")]
    BadStatus { status: u16 },

    #[error("unexpected generation failure: {reason}")]
    Unexpected { reason: String },
}

impl GenerationFailure {
    /// Reply shown to the user in place of the model's text
    pub fn fallback_text(&self) -> &'static str {
        match self {
            GenerationFailure::Timeout => TIMEOUT_FALLBACK,
            GenerationFailure::BadStatus { .. } => STATUS_FALLBACK,
            GenerationFailure::Unexpected { .. } => UNEXPECTED_FALLBACK,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GenerationFailure::Timeout => "timeout",
            GenerationFailure::BadStatus { .. } => "bad_status",
            GenerationFailure::Unexpected { .. } => "unexpected",
        }
    }
}

impl From<ProviderError> for GenerationFailure {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Timeout => GenerationFailure::Timeout,
            ProviderError::Status { status, .. } => GenerationFailure::BadStatus { status },
            other @ (ProviderError::Malformed(_) | ProviderError::Transport(_)) => {
                GenerationFailure::Unexpected {
                    reason: other.to_string(),
                }
            }
        }
    }
}
