// Validated inbound message

use serde::Serialize;

pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const MAX_USER_ID_CHARS: usize = 128;

/// Rejections that happen before the pipeline runs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("User id cannot be empty")]
    EmptyUserId,

    #[error("User id must be at most {max} characters (got {len})")]
    UserIdTooLong { len: usize, max: usize },

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Message must be at most {max} characters (got {len})")]
    MessageTooLong { len: usize, max: usize },
}

/// A user's message, trimmed and length-checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Utterance {
    user_id: String,
    text: String,
}

impl Utterance {
    pub fn new(user_id: &str, message: &str) -> Result<Self, ValidationError> {
        let user_len = user_id.chars().count();
        if user_id.trim().is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        if user_len > MAX_USER_ID_CHARS {
            return Err(ValidationError::UserIdTooLong {
                len: user_len,
                max: MAX_USER_ID_CHARS,
            });
        }

        let len = message.chars().count();
        if len > MAX_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooLong {
                len,
                max: MAX_MESSAGE_CHARS,
            });
        }

        let text = message.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        Ok(Self {
            user_id: user_id.to_string(),
            text: text.to_string(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_trimmed() {
        let utterance = Utterance::new("u1", "  hello \n").unwrap();
        assert_eq!(utterance.text(), "hello");
        assert_eq!(utterance.user_id(), "u1");
    }

    #[test]
    fn test_whitespace_only_is_rejected() {
        assert_eq!(Utterance::new("u1", "   \t"), Err(ValidationError::EmptyMessage));
        assert_eq!(Utterance::new("u1", ""), Err(ValidationError::EmptyMessage));
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_MESSAGE_CHARS);
        assert!(Utterance::new("u1", &at_limit).is_ok());

        let over = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(
            Utterance::new("u1", &over),
            Err(ValidationError::MessageTooLong {
                len: MAX_MESSAGE_CHARS + 1,
                max: MAX_MESSAGE_CHARS
            })
        );
    }

    #[test]
    fn test_user_id_bounds() {
        assert_eq!(Utterance::new("", "hi"), Err(ValidationError::EmptyUserId));
        let long_id = "x".repeat(MAX_USER_ID_CHARS + 1);
        assert!(matches!(
            Utterance::new(&long_id, "hi"),
            Err(ValidationError::UserIdTooLong { .. })
        ));
    }
}
