// Conversation turns and the bounded context window handed to the model

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::providers::{ChatMessage, ChatRole};

/// Number of prior turns kept in the prompt (five user/assistant pairs)
pub const CONTEXT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TurnRole> for ChatRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => ChatRole::User,
            TurnRole::Assistant => ChatRole::Assistant,
        }
    }
}

/// One stored message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        ChatMessage {
            role: turn.role.into(),
            content: turn.text.clone(),
        }
    }
}

/// Trims history to the context window
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    window: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            window: CONTEXT_WINDOW,
        }
    }
}

impl ContextAssembler {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Keep the most recent turns of an oldest-first history
    ///
    /// Order is preserved; nothing is filtered or deduplicated.
    pub fn assemble(&self, history: &[ConversationTurn]) -> Vec<ConversationTurn> {
        let start = history.len().saturating_sub(self.window);
        history[start..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(n: usize) -> Vec<ConversationTurn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ConversationTurn::user(format!("u{}", i))
                } else {
                    ConversationTurn::assistant(format!("a{}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_empty_history() {
        assert!(ContextAssembler::default().assemble(&[]).is_empty());
    }

    #[test]
    fn test_short_history_is_unchanged() {
        let turns = history(4);
        assert_eq!(ContextAssembler::default().assemble(&turns), turns);
    }

    #[test]
    fn test_long_history_keeps_last_ten_in_order() {
        let turns = history(23);
        let window = ContextAssembler::default().assemble(&turns);

        assert_eq!(window.len(), CONTEXT_WINDOW);
        assert_eq!(window, turns[13..].to_vec());
        assert_eq!(window.first().unwrap().text, "a13");
        assert_eq!(window.last().unwrap().text, "u22");
    }

    #[test]
    fn test_duplicates_and_roles_are_kept() {
        let turns = vec![
            ConversationTurn::user("same"),
            ConversationTurn::user("same"),
            ConversationTurn::user("same"),
        ];
        assert_eq!(ContextAssembler::default().assemble(&turns), turns);
    }

    #[test]
    fn test_turn_to_chat_message() {
        let message = ChatMessage::from(&ConversationTurn::assistant("hey"));
        assert_eq!(message.role, ChatRole::Assistant);
        assert_eq!(message.content, "hey");
    }
}
