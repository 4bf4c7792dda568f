// Crisis lexicon, soft-risk thresholds and support message
//
// Everything here is content, not logic: a deployment can replace it with a
// JSON file of the same shape.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::emotion::Emotion;

/// Phrases that flag a message as a crisis on their own
pub const DEFAULT_PHRASES: [&str; 17] = [
    "suicide",
    "kill myself",
    "want to die",
    "hurt myself",
    "no reason to live",
    "self harm",
    "self-harm",
    "end my life",
    "end it all",
    "don't want to live",
    "don't want to be alive",
    "better off dead",
    "can't go on",
    "nothing to live for",
    "take my own life",
    "wish i was dead",
    "not worth living",
];

/// Confidence at or above which sadness/fear alone counts as soft risk
pub const DEFAULT_SOFT_RISK_THRESHOLD: f32 = 0.85;

pub const DEFAULT_SUPPORT_MESSAGE: &str = "\
🆘 **I hear you, and I care about your safety.**

What you're feeling right now is real and valid, but please know that help is available.

**Please reach out to a crisis helpline:**
🇮🇳 India: **iCall – 9152987821** | **Vandrevala Foundation – 1860-2662-345**
🇺🇸 USA: **988 Suicide & Crisis Lifeline – 988**
🌍 International: **Befrienders Worldwide – befrienders.org**

You are not alone. A trained counselor can help you through this moment.
💙 Please talk to someone you trust today.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoftRiskThreshold {
    pub emotion: Emotion,
    pub threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisLexicon {
    pub phrases: Vec<String>,
    #[serde(default = "default_soft_risk")]
    pub soft_risk: Vec<SoftRiskThreshold>,
    #[serde(default = "default_support_message")]
    pub support_message: String,
}

fn default_soft_risk() -> Vec<SoftRiskThreshold> {
    vec![
        SoftRiskThreshold {
            emotion: Emotion::Sadness,
            threshold: DEFAULT_SOFT_RISK_THRESHOLD,
        },
        SoftRiskThreshold {
            emotion: Emotion::Fear,
            threshold: DEFAULT_SOFT_RISK_THRESHOLD,
        },
    ]
}

fn default_support_message() -> String {
    DEFAULT_SUPPORT_MESSAGE.to_string()
}

impl Default for CrisisLexicon {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
            soft_risk: default_soft_risk(),
            support_message: default_support_message(),
        }
    }
}

impl CrisisLexicon {
    /// Load a lexicon from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read crisis lexicon file: {}", path.display()))?;

        let lexicon: CrisisLexicon = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse crisis lexicon: {}", path.display()))?;

        if lexicon.phrases.iter().all(|p| p.trim().is_empty()) {
            anyhow::bail!("Crisis lexicon {} has no phrases", path.display());
        }

        Ok(lexicon)
    }

    /// Threshold for `emotion`, if it is a soft-risk emotion
    pub fn threshold_for(&self, emotion: Emotion) -> Option<f32> {
        self.soft_risk
            .iter()
            .find(|t| t.emotion == emotion)
            .map(|t| t.threshold)
    }
}
