// Crisis detection
// Lexicon-driven phrase matching plus emotion soft-risk thresholds

mod detector;
mod lexicon;

pub use detector::{CrisisDetector, CrisisSignal, CrisisVerdict, MatchMode};
pub use lexicon::{
    CrisisLexicon, SoftRiskThreshold, DEFAULT_PHRASES, DEFAULT_SOFT_RISK_THRESHOLD,
    DEFAULT_SUPPORT_MESSAGE,
};
