//! Classifier trait and common types

use async_trait::async_trait;
use reviewguard_core::{Result, RuleVerdict, SpamLabel};
use serde::Serialize;

/// Trait for review classifiers that can be composed behind one interface
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given review text
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Get the tier (performance category)
    fn tier(&self) -> ClassifierTier;
}

/// Result of classifying one review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Final verdict
    pub label: SpamLabel,

    /// Spam probability (0.0-1.0)
    pub score: f32,

    /// Verdict of the rule scorer, when the classifier runs one
    pub rule_verdict: Option<RuleVerdict>,

    /// Triggered indicators explaining the verdict
    pub indicators: Vec<String>,

    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    pub fn is_spam(&self) -> bool {
        self.label == SpamLabel::Spam
    }

    /// Check if the spam score reaches a threshold
    pub fn exceeds_threshold(&self, threshold: f32) -> bool {
        self.score >= threshold
    }

    /// Whether the measured latency fits the tier's budget
    pub fn within_budget(&self, tier: ClassifierTier) -> bool {
        self.latency_us <= tier.latency_budget_us()
    }

    /// Score recorded for a label, if the classifier reported one
    pub fn score_for(&self, label: SpamLabel) -> Option<f32> {
        self.metadata
            .all_scores
            .iter()
            .find(|(l, _)| *l == label)
            .map(|&(_, score)| score)
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,

    /// Per-label scores
    pub all_scores: Vec<(SpamLabel, f32)>,
}

/// Classifier performance tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassifierTier {
    /// Ultra-fast (<2ms) - surface-feature rules only
    A,
    /// Fast (<5ms) - sparse vector space plus a linear model
    B,
}

impl ClassifierTier {
    /// Get the latency budget for this tier in microseconds
    pub fn latency_budget_us(&self) -> u64 {
        match self {
            Self::A => 2_000,
            Self::B => 5_000,
        }
    }
}
