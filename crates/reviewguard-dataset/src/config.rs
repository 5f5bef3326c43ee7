//! Configuration for dataset ingestion, schema inference and label mapping

use reviewguard_core::{CanonicalSentiment, Error, NormalizerConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keyword lists and thresholds used by [`crate::SchemaInferrer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Column-name keywords for the review text column, in priority order
    #[serde(default = "default_text_keywords")]
    pub text_keywords: Vec<String>,

    /// Column-name keywords for the sentiment label column
    #[serde(default = "default_label_keywords")]
    pub label_keywords: Vec<String>,

    /// Column-name keywords for the star rating column
    #[serde(default = "default_rating_keywords")]
    pub rating_keywords: Vec<String>,

    /// Non-missing values sampled per column when scoring text candidates
    #[serde(default = "default_text_sample_size")]
    pub text_sample_size: usize,

    /// Minimum sampled values for a column to compete as the text column
    #[serde(default = "default_min_text_samples")]
    pub min_text_samples: usize,

    /// Minimum non-missing values for a column to compete as the label column
    #[serde(default = "default_min_label_rows")]
    pub min_label_rows: usize,

    /// Minimum content score for a label column to be adopted
    #[serde(default = "default_label_adoption_threshold")]
    pub label_adoption_threshold: f64,

    /// Cap on distinct textual values inspected for sentiment keywords
    #[serde(default = "default_label_text_sample")]
    pub label_text_sample: usize,

    /// Keyword families (negative, neutral, positive) searched in label values
    #[serde(default = "default_sentiment_families")]
    pub sentiment_families: Vec<Vec<String>>,

    /// A label column holds at most this many distinct textual values
    #[serde(default = "default_max_label_values")]
    pub max_label_values: usize,

    /// Distinct counts above this on both views mark a free-text column
    #[serde(default = "default_free_text_distinct")]
    pub free_text_distinct: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            text_keywords: default_text_keywords(),
            label_keywords: default_label_keywords(),
            rating_keywords: default_rating_keywords(),
            text_sample_size: default_text_sample_size(),
            min_text_samples: default_min_text_samples(),
            min_label_rows: default_min_label_rows(),
            label_adoption_threshold: default_label_adoption_threshold(),
            label_text_sample: default_label_text_sample(),
            sentiment_families: default_sentiment_families(),
            max_label_values: default_max_label_values(),
            free_text_distinct: default_free_text_distinct(),
        }
    }
}

/// Raw-label synonym table used by [`crate::LabelReconciler`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Lower-cased label value to canonical sentiment
    #[serde(default = "default_label_mapping")]
    pub mapping: BTreeMap<String, CanonicalSentiment>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            mapping: default_label_mapping(),
        }
    }
}

/// Ingest-side configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default)]
    pub schema: SchemaConfig,

    #[serde(default)]
    pub labels: LabelConfig,

    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

impl DatasetConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Invalid dataset config: {e}")))
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_text_keywords() -> Vec<String> {
    strings(&[
        "text", "review", "comment", "sentence", "yorum", "content", "body", "metin", "cumle",
        "cümle", "tweet",
    ])
}

fn default_label_keywords() -> Vec<String> {
    strings(&[
        "label", "sentiment", "class", "polarity", "duygu", "target", "etiket", "kategori",
        "category", "emotion", "tag",
    ])
}

fn default_rating_keywords() -> Vec<String> {
    strings(&["rating", "star", "stars", "score", "rate", "puan", "yildiz", "rating_score"])
}

fn default_text_sample_size() -> usize {
    5000
}

fn default_min_text_samples() -> usize {
    100
}

fn default_min_label_rows() -> usize {
    500
}

fn default_label_adoption_threshold() -> f64 {
    3.0
}

fn default_label_text_sample() -> usize {
    200
}

fn default_sentiment_families() -> Vec<Vec<String>> {
    vec![
        strings(&["neg", "olumsuz", "kötü", "kotu"]),
        strings(&["neu", "nötr", "notr"]),
        strings(&["pos", "olumlu", "iyi"]),
    ]
}

fn default_max_label_values() -> usize {
    10
}

fn default_free_text_distinct() -> usize {
    50
}

fn default_label_mapping() -> BTreeMap<String, CanonicalSentiment> {
    use CanonicalSentiment::*;

    [
        ("negative", Negative),
        ("neg", Negative),
        ("olumsuz", Negative),
        ("kötü", Negative),
        ("kotu", Negative),
        ("0", Negative),
        ("-1", Negative),
        ("neutral", Neutral),
        ("neu", Neutral),
        ("nötr", Neutral),
        ("notr", Neutral),
        ("1", Neutral),
        ("positive", Positive),
        ("pos", Positive),
        ("olumlu", Positive),
        ("iyi", Positive),
        ("2", Positive),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DatasetConfig::default();
        assert_eq!(config.schema.min_label_rows, 500);
        assert_eq!(config.schema.text_keywords[4], "yorum");
        assert_eq!(config.schema.sentiment_families.len(), 3);
        assert_eq!(
            config.labels.mapping.get("olumsuz"),
            Some(&CanonicalSentiment::Negative)
        );
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
schema:
  min_label_rows: 20
  text_keywords: [body]
normalizer:
  stemmer: null
"#;

        let config = DatasetConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.schema.min_label_rows, 20);
        assert_eq!(config.schema.text_keywords, vec!["body".to_string()]);
        assert_eq!(config.schema.rating_keywords.len(), 8);
        assert_eq!(config.normalizer.stemmer, None);
        assert_eq!(config.labels, LabelConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = DatasetConfig::from_yaml("schema: [1, 2");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
