//! Configuration for the spam engine and its training pipeline

use reviewguard_core::{Error, NormalizerConfig, Result};
use serde::{Deserialize, Serialize};

/// Aggregated engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub normalizer: NormalizerConfig,

    #[serde(default)]
    pub rules: RuleConfig,

    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    #[serde(default)]
    pub anomaly: AnomalyConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub training: TrainingConfig,
}

impl EngineConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("Invalid engine config: {e}")))
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// Keyword lists, weights and thresholds of the rule scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Placeholder atoms whose presence marks a contact/link
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,

    /// Stock positive boilerplate phrases
    #[serde(default = "default_generic_positive")]
    pub generic_positive_phrases: Vec<String>,

    /// Stock negative boilerplate phrases
    #[serde(default = "default_generic_negative")]
    pub generic_negative_phrases: Vec<String>,

    /// Keywords of genuine complaints (return, exchange, broken, damaged, delayed)
    #[serde(default = "default_complaint_keywords")]
    pub complaint_keywords: Vec<String>,

    /// Inclusive code point ranges counted as emoji
    #[serde(default = "default_emoji_ranges")]
    pub emoji_ranges: Vec<(u32, u32)>,

    #[serde(default = "default_placeholder_weight")]
    pub placeholder_weight: i32,

    #[serde(default = "default_exclamation_threshold")]
    pub exclamation_threshold: usize,

    #[serde(default = "default_one")]
    pub exclamation_weight: i32,

    #[serde(default = "default_emoji_threshold")]
    pub emoji_threshold: usize,

    #[serde(default = "default_one")]
    pub emoji_weight: i32,

    /// Uppercase ratio must exceed this
    #[serde(default = "default_uppercase_ratio")]
    pub uppercase_ratio: f64,

    /// Raw text must be longer than this for the uppercase rule
    #[serde(default = "default_uppercase_min_length")]
    pub uppercase_min_length: usize,

    #[serde(default = "default_one")]
    pub uppercase_weight: i32,

    /// Token count at or below which a generic phrase is boilerplate
    #[serde(default = "default_short_generic_tokens")]
    pub short_generic_tokens: usize,

    #[serde(default = "default_short_generic_weight")]
    pub short_generic_weight: i32,

    /// Normalized length at or below which a generic phrase is boilerplate
    #[serde(default = "default_compact_generic_length")]
    pub compact_generic_length: usize,

    #[serde(default = "default_one")]
    pub compact_generic_weight: i32,

    /// Minimum token count for the complaint override
    #[serde(default = "default_complaint_min_tokens")]
    pub complaint_min_tokens: usize,

    /// Score at or above which the verdict is Spam
    #[serde(default = "default_spam_threshold")]
    pub spam_threshold: i32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            placeholders: default_placeholders(),
            generic_positive_phrases: default_generic_positive(),
            generic_negative_phrases: default_generic_negative(),
            complaint_keywords: default_complaint_keywords(),
            emoji_ranges: default_emoji_ranges(),
            placeholder_weight: default_placeholder_weight(),
            exclamation_threshold: default_exclamation_threshold(),
            exclamation_weight: default_one(),
            emoji_threshold: default_emoji_threshold(),
            emoji_weight: default_one(),
            uppercase_ratio: default_uppercase_ratio(),
            uppercase_min_length: default_uppercase_min_length(),
            uppercase_weight: default_one(),
            short_generic_tokens: default_short_generic_tokens(),
            short_generic_weight: default_short_generic_weight(),
            compact_generic_length: default_compact_generic_length(),
            compact_generic_weight: default_one(),
            complaint_min_tokens: default_complaint_min_tokens(),
            spam_threshold: default_spam_threshold(),
        }
    }
}

/// TF-IDF vector space parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Token regex; every match is one token
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,

    /// Inclusive n-gram lengths
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Minimum document count for a term
    #[serde(default = "default_min_df")]
    pub min_df: usize,

    /// Maximum document fraction for a term
    #[serde(default = "default_max_df")]
    pub max_df: f64,

    /// Vocabulary cap, keeping the most frequent terms
    #[serde(default = "default_max_features")]
    pub max_features: Option<usize>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            token_pattern: default_token_pattern(),
            ngram_range: default_ngram_range(),
            min_df: default_min_df(),
            max_df: default_max_df(),
            max_features: default_max_features(),
        }
    }
}

/// Isolation forest parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Samples drawn per tree; `None` uses min(256, n)
    #[serde(default)]
    pub max_samples: Option<usize>,

    /// Expected outlier fraction
    #[serde(default = "default_contamination")]
    pub contamination: f64,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            max_samples: None,
            contamination: default_contamination(),
            seed: default_seed(),
        }
    }
}

/// Logistic regression parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Inverse L2 regularization strength
    #[serde(default = "default_c")]
    pub c: f64,

    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Stop once every gradient component is below this
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Weight classes inversely to their frequency
    #[serde(default = "default_true")]
    pub balanced: bool,

    /// Probability above which `predict` returns spam
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            c: default_c(),
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
            learning_rate: default_learning_rate(),
            balanced: default_true(),
            decision_threshold: default_decision_threshold(),
        }
    }
}

/// Hybrid labeling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Occurrences of one normalized text that force it to Spam
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: default_duplicate_threshold(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_placeholders() -> Vec<String> {
    strings(&["<url>", "<email>", "<phone>"])
}

fn default_generic_positive() -> Vec<String> {
    strings(&[
        "harika",
        "mukemmel",
        "super",
        "tavsiye ederim",
        "kesinlikle alin",
        "bayildim",
        "muhtesem",
        "efsane",
        "cok iyi",
        "gayet iyi",
    ])
}

fn default_generic_negative() -> Vec<String> {
    strings(&[
        "berbat",
        "rezalet",
        "asla almayin",
        "dolandiricilik",
        "iade",
        "pismanlik",
    ])
}

fn default_complaint_keywords() -> Vec<String> {
    strings(&["iade", "degisim", "kirik", "bozuk", "gecikti"])
}

fn default_emoji_ranges() -> Vec<(u32, u32)> {
    vec![(0x1F300, 0x1FAFF)]
}

fn default_placeholder_weight() -> i32 {
    3
}

fn default_exclamation_threshold() -> usize {
    4
}

fn default_emoji_threshold() -> usize {
    3
}

fn default_one() -> i32 {
    1
}

fn default_uppercase_ratio() -> f64 {
    0.6
}

fn default_uppercase_min_length() -> usize {
    10
}

fn default_short_generic_tokens() -> usize {
    3
}

fn default_short_generic_weight() -> i32 {
    2
}

fn default_compact_generic_length() -> usize {
    20
}

fn default_complaint_min_tokens() -> usize {
    6
}

fn default_spam_threshold() -> i32 {
    3
}

fn default_token_pattern() -> String {
    r"\b\w\w+\b".to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_min_df() -> usize {
    3
}

fn default_max_df() -> f64 {
    0.9
}

fn default_max_features() -> Option<usize> {
    Some(2000)
}

fn default_n_estimators() -> usize {
    100
}

fn default_contamination() -> f64 {
    0.05
}

fn default_seed() -> u64 {
    42
}

fn default_c() -> f64 {
    1.0
}

fn default_max_iter() -> usize {
    1000
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_learning_rate() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_decision_threshold() -> f64 {
    0.5
}

fn default_duplicate_threshold() -> usize {
    10
}
