// Mood analytics: emotion distribution and timeline over a lookback window

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::emotion::Emotion;
use crate::storage::{MoodLogReader, MoodSample, StoreError};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

const EMPTY_MESSAGE: &str = "No mood data yet. Start chatting to track your emotions!";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionCount {
    pub emotion: Emotion,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub date: DateTime<Utc>,
    pub emotion: Emotion,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSummary {
    /// Most common emotion first; ties keep first-seen order
    ///
    /// Serialized as a `{"emotion": count}` object in the same order.
    #[serde(serialize_with = "serialize_distribution")]
    pub distribution: Vec<EmotionCount>,
    pub timeline: Vec<TimelinePoint>,
    pub total_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn serialize_distribution<S>(distribution: &[EmotionCount], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(distribution.iter().map(|c| (c.emotion.as_str(), c.count)))
}

impl MoodSummary {
    pub fn from_samples(samples: &[MoodSample]) -> Self {
        if samples.is_empty() {
            return Self {
                distribution: Vec::new(),
                timeline: Vec::new(),
                total_entries: 0,
                message: Some(EMPTY_MESSAGE.to_string()),
            };
        }

        let mut first_seen: Vec<Emotion> = Vec::new();
        let mut counts: HashMap<Emotion, usize> = HashMap::new();
        for sample in samples {
            let count = counts.entry(sample.emotion).or_insert(0);
            if *count == 0 {
                first_seen.push(sample.emotion);
            }
            *count += 1;
        }

        let mut distribution: Vec<EmotionCount> = first_seen
            .into_iter()
            .map(|emotion| EmotionCount {
                emotion,
                count: counts[&emotion],
            })
            .collect();
        // Stable sort keeps first-seen order among equal counts
        distribution.sort_by(|a, b| b.count.cmp(&a.count));

        let timeline = samples
            .iter()
            .map(|s| TimelinePoint {
                date: s.created_at,
                emotion: s.emotion,
                confidence: s.confidence,
            })
            .collect();

        Self {
            distribution,
            timeline,
            total_entries: samples.len(),
            message: None,
        }
    }
}

/// Summarise the last `days` days of mood samples for a user
pub async fn summarize(
    reader: &dyn MoodLogReader,
    user_id: &str,
    days: u32,
) -> Result<MoodSummary, StoreError> {
    let since = Utc::now() - Duration::days(i64::from(days));
    let samples = reader.mood_history(user_id, since).await?;
    Ok(MoodSummary::from_samples(&samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(emotion: Emotion, minutes: i64) -> MoodSample {
        MoodSample {
            emotion,
            confidence: 0.9,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_empty_summary_has_message() {
        let summary = MoodSummary::from_samples(&[]);
        assert_eq!(summary.total_entries, 0);
        assert!(summary.message.is_some());
        assert!(summary.distribution.is_empty());
    }

    #[test]
    fn test_distribution_most_common_first() {
        let samples = vec![
            sample(Emotion::Joy, 0),
            sample(Emotion::Sadness, 1),
            sample(Emotion::Sadness, 2),
            sample(Emotion::Fear, 3),
        ];
        let summary = MoodSummary::from_samples(&samples);

        assert_eq!(summary.total_entries, 4);
        assert_eq!(
            summary.distribution,
            vec![
                EmotionCount {
                    emotion: Emotion::Sadness,
                    count: 2
                },
                EmotionCount {
                    emotion: Emotion::Joy,
                    count: 1
                },
                EmotionCount {
                    emotion: Emotion::Fear,
                    count: 1
                },
            ]
        );
        assert_eq!(summary.timeline.len(), 4);
        assert_eq!(summary.timeline[3].emotion, Emotion::Fear);
        assert!(summary.message.is_none());
    }

    #[test]
    fn test_distribution_serializes_as_ordered_object() {
        let samples = vec![
            sample(Emotion::Joy, 0),
            sample(Emotion::Sadness, 1),
            sample(Emotion::Sadness, 2),
        ];
        let json = serde_json::to_string(&MoodSummary::from_samples(&samples)).unwrap();
        assert!(json.starts_with(r#"{"distribution":{"sadness":2,"joy":1},"timeline":["#));

        let empty = serde_json::to_value(MoodSummary::from_samples(&[])).unwrap();
        assert_eq!(empty["distribution"], serde_json::json!({}));
    }
}
