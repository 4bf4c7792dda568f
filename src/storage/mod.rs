// Storage collaborators
//
// The pipeline reads history and writes turns/mood samples through these
// traits. Writes are best-effort: callers log failures and carry on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod memory;
mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use crate::context::{ConversationTurn, TurnRole};
use crate::emotion::Emotion;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("store request failed: {0}")]
    Transport(String),

    #[error("could not decode store response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

/// A persisted emotion observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSample {
    pub emotion: Emotion,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
}

/// Reads the recent conversation of a user
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Up to `limit` most recent turns, oldest first
    async fn recent_turns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError>;
}

/// Writes turns and mood samples
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn save_turn(
        &self,
        user_id: &str,
        role: TurnRole,
        text: &str,
        emotion: Option<Emotion>,
    ) -> Result<(), StoreError>;

    async fn save_mood_sample(
        &self,
        user_id: &str,
        emotion: Emotion,
        confidence: f32,
    ) -> Result<(), StoreError>;
}

/// Reads mood samples for analytics
#[async_trait]
pub trait MoodLogReader: Send + Sync {
    /// Samples created at or after `since`, oldest first
    async fn mood_history(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<MoodSample>, StoreError>;
}

/// One backend viewed through each of its roles
#[derive(Clone)]
pub struct Storage {
    pub history: Arc<dyn HistoryStore>,
    pub persistence: Arc<dyn PersistenceStore>,
    pub moods: Arc<dyn MoodLogReader>,
}

impl Storage {
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: HistoryStore + PersistenceStore + MoodLogReader + 'static,
    {
        Self {
            history: backend.clone(),
            persistence: backend.clone(),
            moods: backend,
        }
    }
}
