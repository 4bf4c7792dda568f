// Supabase (PostgREST) store
//
// Tables:
//   chats(user_id, role, message, emotion, created_at)
//   mood_logs(user_id, emotion, confidence, created_at)
// The service key bypasses row-level security; the backend acts for users.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{HistoryStore, MoodLogReader, MoodSample, PersistenceStore, StoreError};
use crate::context::{ConversationTurn, TurnRole};
use crate::emotion::Emotion;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const CHATS_TABLE: &str = "chats";
const MOOD_TABLE: &str = "mood_logs";

pub struct SupabaseStore {
    client: Client,
    rest_url: String,
    service_key: String,
}

impl SupabaseStore {
    pub fn new(project_url: &str, service_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            service_key: service_key.into(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("content-type", "application/json")
            .header("Prefer", "return=representation")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String, StoreError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> Result<(), StoreError> {
        self.send(self.request(Method::POST, table).json(row)).await?;
        Ok(())
    }

    async fn select<T: for<'de> Deserialize<'de>>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let body = self
            .send(self.request(Method::GET, table).query(query))
            .await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Serialize)]
struct ChatInsert<'a> {
    user_id: &'a str,
    role: TurnRole,
    message: &'a str,
    emotion: Option<Emotion>,
    created_at: String,
}

#[derive(Deserialize)]
struct ChatRow {
    role: TurnRole,
    message: String,
}

#[derive(Serialize)]
struct MoodInsert<'a> {
    user_id: &'a str,
    emotion: Emotion,
    confidence: f32,
    created_at: String,
}

#[derive(Deserialize)]
struct MoodRow {
    emotion: String,
    confidence: f32,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl HistoryStore for SupabaseStore {
    async fn recent_turns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let query = [
            ("select", "role,message".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        let rows: Vec<ChatRow> = self.select(CHATS_TABLE, &query).await?;

        // Newest first on the wire; the pipeline wants oldest first
        Ok(rows
            .into_iter()
            .rev()
            .map(|row| ConversationTurn {
                role: row.role,
                text: row.message,
            })
            .collect())
    }
}

#[async_trait]
impl PersistenceStore for SupabaseStore {
    async fn save_turn(
        &self,
        user_id: &str,
        role: TurnRole,
        text: &str,
        emotion: Option<Emotion>,
    ) -> Result<(), StoreError> {
        let row = ChatInsert {
            user_id,
            role,
            message: text,
            emotion,
            created_at: timestamp(Utc::now()),
        };
        self.insert(CHATS_TABLE, &row).await
    }

    async fn save_mood_sample(
        &self,
        user_id: &str,
        emotion: Emotion,
        confidence: f32,
    ) -> Result<(), StoreError> {
        let row = MoodInsert {
            user_id,
            emotion,
            confidence,
            created_at: timestamp(Utc::now()),
        };
        self.insert(MOOD_TABLE, &row).await
    }
}

#[async_trait]
impl MoodLogReader for SupabaseStore {
    async fn mood_history(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<MoodSample>, StoreError> {
        let query = [
            ("select", "emotion,confidence,created_at".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("created_at", format!("gte.{}", timestamp(since))),
            ("order", "created_at.asc".to_string()),
        ];
        let rows: Vec<MoodRow> = self.select(MOOD_TABLE, &query).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match row.emotion.parse::<Emotion>() {
                Ok(emotion) => Some(MoodSample {
                    emotion,
                    confidence: row.confidence,
                    created_at: row.created_at,
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping mood log with unknown emotion");
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_url() {
        let store = SupabaseStore::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(store.rest_url, "https://abc.supabase.co/rest/v1");
    }

    #[test]
    fn test_chat_insert_shape() {
        let row = ChatInsert {
            user_id: "u1",
            role: TurnRole::Assistant,
            message: "hi",
            emotion: None,
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json["emotion"].is_null());
        assert_eq!(json["message"], "hi");
    }
}
