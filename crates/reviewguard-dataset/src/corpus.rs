//! Corpus assembly: schema-resolved rows turned into normalized records

use crate::labels::LabelReconciler;
use crate::schema::SchemaInference;
use reviewguard_core::{CanonicalSentiment, Dataset, Error, Result, TextNormalizer};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One usable review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    /// Original text cell
    pub raw: String,
    /// Normalized text, never empty
    pub normalized: String,
    /// Canonical sentiment when a label column resolved for this row
    pub sentiment: Option<CanonicalSentiment>,
}

/// Row accounting for a built corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_rows: usize,
    pub empty_text: usize,
    pub unresolved_labels: usize,
    pub records: usize,
}

/// Normalized review corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    pub records: Vec<CorpusRecord>,
    pub stats: CorpusStats,
    /// False when no label column exists or none of its values resolved
    pub labels_available: bool,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw texts in record order
    pub fn raw_texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.raw.as_str()).collect()
    }

    /// Normalized texts in record order
    pub fn normalized_texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.normalized.as_str()).collect()
    }
}

/// Builds a [`Corpus`] from a dataset and its inferred schema
#[derive(Debug)]
pub struct CorpusBuilder {
    normalizer: TextNormalizer,
    reconciler: LabelReconciler,
}

impl CorpusBuilder {
    pub fn new(normalizer: TextNormalizer, reconciler: LabelReconciler) -> Self {
        Self {
            normalizer,
            reconciler,
        }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Normalize every row, drop empty texts, and attach resolved labels.
    ///
    /// If the label column resolves nowhere the records are kept without
    /// sentiment and `labels_available` is false.
    pub fn build(&self, dataset: &Dataset, schema: &SchemaInference) -> Result<Corpus> {
        let text_column = schema
            .text_column
            .as_deref()
            .ok_or_else(|| Error::dataset("no text column"))?;
        let text_index = dataset
            .column_index(text_column)
            .ok_or_else(|| Error::dataset(format!("text column '{text_column}' not in dataset")))?;

        let label_index = match schema.label_column.as_deref() {
            Some(name) => Some(dataset.column_index(name).ok_or_else(|| {
                Error::dataset(format!("label column '{name}' not in dataset"))
            })?),
            None => None,
        };

        let mut stats = CorpusStats {
            total_rows: dataset.len(),
            ..CorpusStats::default()
        };

        let mut records = Vec::with_capacity(dataset.len());
        for row in dataset.rows() {
            let raw = row.get(text_index).unwrap_or_default();
            let normalized = self.normalizer.normalize(raw);
            if normalized.is_empty() {
                stats.empty_text += 1;
                continue;
            }
            let sentiment = label_index.and_then(|i| self.reconciler.resolve(row.get(i)));
            records.push(CorpusRecord {
                raw: raw.to_string(),
                normalized,
                sentiment,
            });
        }

        let mut labels_available = false;
        if label_index.is_some() {
            let resolved = records.iter().filter(|r| r.sentiment.is_some()).count();
            stats.unresolved_labels = records.len() - resolved;

            if resolved == 0 {
                warn!(
                    rows = records.len(),
                    "No label values resolved; corpus carries no sentiment labels"
                );
            } else {
                records.retain(|r| r.sentiment.is_some());
                labels_available = true;
            }
            metrics::counter!("reviewguard_dataset_rows_dropped_total", "reason" => "unresolved_label")
                .increment(stats.unresolved_labels as u64);
        }
        metrics::counter!("reviewguard_dataset_rows_dropped_total", "reason" => "empty_text")
            .increment(stats.empty_text as u64);

        stats.records = records.len();
        info!(
            total = stats.total_rows,
            kept = stats.records,
            empty_text = stats.empty_text,
            unresolved_labels = stats.unresolved_labels,
            "Built corpus"
        );

        Ok(Corpus {
            records,
            stats,
            labels_available,
        })
    }
}

impl Default for CorpusBuilder {
    fn default() -> Self {
        Self::new(TextNormalizer::default(), LabelReconciler::default())
    }
}
