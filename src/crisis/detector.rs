// Crisis detector
//
// Two signals, checked in order: an explicit phrase in the text, then a
// high-confidence sadness/fear classification. The phrase check wins and
// short-circuits the threshold check.

use regex::Regex;
use serde::Serialize;

use super::lexicon::CrisisLexicon;
use crate::emotion::{Emotion, EmotionResult};

/// How lexicon phrases are matched against the normalized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Plain substring search ("suicidesqueeze" still matches "suicide")
    #[default]
    Substring,
    /// Phrase must start and end on a word boundary
    WordBoundary,
}

/// Which signal raised the verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum CrisisSignal {
    Lexical { phrase: String },
    Threshold { emotion: Emotion, confidence: f32 },
}

impl CrisisSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrisisSignal::Lexical { .. } => "lexical",
            CrisisSignal::Threshold { .. } => "threshold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrisisVerdict {
    pub is_crisis: bool,
    pub support_message: Option<String>,
    pub signal: Option<CrisisSignal>,
}

impl CrisisVerdict {
    pub fn safe() -> Self {
        Self {
            is_crisis: false,
            support_message: None,
            signal: None,
        }
    }

    fn raised(signal: CrisisSignal, support_message: &str) -> Self {
        Self {
            is_crisis: true,
            support_message: Some(support_message.to_string()),
            signal: Some(signal),
        }
    }
}

/// Stateless detector; cheap to clone and share across requests
#[derive(Debug, Clone)]
pub struct CrisisDetector {
    lexicon: CrisisLexicon,
    /// Lowercased phrases
    phrases: Vec<String>,
    /// Compiled boundary patterns with the phrase each one came from
    patterns: Vec<(Regex, String)>,
    mode: MatchMode,
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(CrisisLexicon::default())
    }
}

impl CrisisDetector {
    pub fn new(lexicon: CrisisLexicon) -> Self {
        let phrases = lexicon
            .phrases
            .iter()
            .map(|p| normalize(p))
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            lexicon,
            phrases,
            patterns: Vec::new(),
            mode: MatchMode::Substring,
        }
    }

    /// Switch to word-boundary matching
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self.patterns = match mode {
            MatchMode::Substring => Vec::new(),
            MatchMode::WordBoundary => self
                .phrases
                .iter()
                .filter_map(|p| {
                    Regex::new(&format!(r"\b{}\b", regex::escape(p)))
                        .ok()
                        .map(|re| (re, p.clone()))
                })
                .collect(),
        };
        self
    }

    /// Decide whether `text` signals a crisis
    pub fn detect(&self, text: &str, emotion: &EmotionResult) -> CrisisVerdict {
        let normalized = normalize(text);

        if let Some(phrase) = self.matched_phrase(&normalized) {
            tracing::warn!(phrase = %phrase, "Crisis detected: lexicon phrase");
            return CrisisVerdict::raised(
                CrisisSignal::Lexical {
                    phrase: phrase.to_string(),
                },
                &self.lexicon.support_message,
            );
        }

        if let Some(threshold) = self.lexicon.threshold_for(emotion.label) {
            if emotion.confidence >= threshold {
                tracing::warn!(
                    emotion = %emotion.label,
                    confidence = emotion.confidence,
                    threshold,
                    "Crisis detected: emotion threshold"
                );
                return CrisisVerdict::raised(
                    CrisisSignal::Threshold {
                        emotion: emotion.label,
                        confidence: emotion.confidence,
                    },
                    &self.lexicon.support_message,
                );
            }
        }

        CrisisVerdict::safe()
    }

    fn matched_phrase(&self, normalized: &str) -> Option<&str> {
        match self.mode {
            MatchMode::Substring => self
                .phrases
                .iter()
                .find(|p| normalized.contains(p.as_str()))
                .map(|p| p.as_str()),
            MatchMode::WordBoundary => self
                .patterns
                .iter()
                .find(|(re, _)| re.is_match(normalized))
                .map(|(_, p)| p.as_str()),
        }
    }
}

/// Lowercase, trim, and fold typographic apostrophes to ASCII
fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}
