// In-process store for development and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::{HistoryStore, MoodLogReader, MoodSample, PersistenceStore, StoreError};
use crate::context::{ConversationTurn, TurnRole};
use crate::emotion::Emotion;

/// A turn as recorded by the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTurn {
    pub id: Uuid,
    pub role: TurnRole,
    pub text: String,
    pub emotion: Option<Emotion>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct UserLog {
    turns: Vec<StoredTurn>,
    moods: Vec<MoodSample>,
}

/// Per-user logs in a concurrent map; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, UserLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything stored for `user_id`, oldest first
    pub fn turns(&self, user_id: &str) -> Vec<StoredTurn> {
        self.users
            .get(user_id)
            .map(|log| log.turns.clone())
            .unwrap_or_default()
    }

    pub fn mood_samples(&self, user_id: &str) -> Vec<MoodSample> {
        self.users
            .get(user_id)
            .map(|log| log.moods.clone())
            .unwrap_or_default()
    }

    /// Record a mood sample with an explicit timestamp
    pub fn insert_mood_sample(&self, user_id: &str, sample: MoodSample) {
        self.users
            .entry(user_id.to_string())
            .or_default()
            .moods
            .push(sample);
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn recent_turns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let Some(log) = self.users.get(user_id) else {
            return Ok(Vec::new());
        };

        let start = log.turns.len().saturating_sub(limit);
        Ok(log.turns[start..]
            .iter()
            .map(|t| ConversationTurn {
                role: t.role,
                text: t.text.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl PersistenceStore for MemoryStore {
    async fn save_turn(
        &self,
        user_id: &str,
        role: TurnRole,
        text: &str,
        emotion: Option<Emotion>,
    ) -> Result<(), StoreError> {
        self.users
            .entry(user_id.to_string())
            .or_default()
            .turns
            .push(StoredTurn {
                id: Uuid::new_v4(),
                role,
                text: text.to_string(),
                emotion,
                created_at: Utc::now(),
            });
        Ok(())
    }

    async fn save_mood_sample(
        &self,
        user_id: &str,
        emotion: Emotion,
        confidence: f32,
    ) -> Result<(), StoreError> {
        self.insert_mood_sample(
            user_id,
            MoodSample {
                emotion,
                confidence,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl MoodLogReader for MemoryStore {
    async fn mood_history(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<MoodSample>, StoreError> {
        let mut samples: Vec<MoodSample> = self
            .mood_samples(user_id)
            .into_iter()
            .filter(|s| s.created_at >= since)
            .collect();
        samples.sort_by_key(|s| s.created_at);
        Ok(samples)
    }
}
