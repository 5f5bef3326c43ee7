//! Training-label reconciliation
//!
//! Combines the rule verdict with the anomaly flag through a fixed lookup
//! table, then forces every heavily repeated normalized text to `Spam`.
//!
//! The duplicate override runs after the table and wins over every other
//! signal, including the complaint override of the rule scorer: a genuine
//! complaint repeated `duplicate_threshold` times is labeled `Spam` for
//! training.

use crate::config::TrainingConfig;
use reviewguard_core::{Error, HybridLabel, Result, RuleVerdict, SpamLabel};
use std::collections::HashMap;

/// `(rule verdict, anomaly flag) -> hybrid label`
const BASE_TABLE: [((RuleVerdict, bool), HybridLabel); 6] = [
    ((SpamLabel::Spam, false), SpamLabel::Spam),
    ((SpamLabel::Spam, true), SpamLabel::Spam),
    ((SpamLabel::Real, false), SpamLabel::Real),
    ((SpamLabel::Real, true), SpamLabel::Uncertain),
    ((SpamLabel::Uncertain, false), SpamLabel::Uncertain),
    ((SpamLabel::Uncertain, true), SpamLabel::Spam),
];

/// Outcome of labeling a corpus
#[derive(Debug, Clone, PartialEq)]
pub struct HybridLabels {
    pub labels: Vec<HybridLabel>,
    /// Records whose label the duplicate override changed
    pub duplicate_overrides: usize,
}

#[derive(Debug, Clone, Default)]
pub struct HybridLabeler {
    config: TrainingConfig,
}

impl HybridLabeler {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Base-table label of one record
    pub fn reconcile(&self, verdict: RuleVerdict, anomalous: bool) -> HybridLabel {
        BASE_TABLE
            .iter()
            .find(|(key, _)| *key == (verdict, anomalous))
            .map(|&(_, label)| label)
            .unwrap_or(SpamLabel::Uncertain)
    }

    /// Label a whole corpus: base table per record, then the duplicate
    /// override over all normalized texts. The three slices must be
    /// parallel.
    pub fn label_corpus<S: AsRef<str>>(
        &self,
        normalized: &[S],
        verdicts: &[RuleVerdict],
        anomalies: &[bool],
    ) -> Result<HybridLabels> {
        if verdicts.len() != normalized.len() || anomalies.len() != normalized.len() {
            return Err(Error::training(format!(
                "{} texts but {} rule verdicts and {} anomaly flags",
                normalized.len(),
                verdicts.len(),
                anomalies.len()
            )));
        }

        let mut labels: Vec<HybridLabel> = verdicts
            .iter()
            .zip(anomalies)
            .map(|(&verdict, &anomalous)| self.reconcile(verdict, anomalous))
            .collect();

        let duplicate_overrides = self.apply_duplicate_override(normalized, &mut labels);

        Ok(HybridLabels {
            labels,
            duplicate_overrides,
        })
    }

    /// Force `Spam` on every text occurring at least `duplicate_threshold`
    /// times; returns how many labels changed.
    pub fn apply_duplicate_override<S: AsRef<str>>(
        &self,
        normalized: &[S],
        labels: &mut [HybridLabel],
    ) -> usize {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for text in normalized {
            *counts.entry(text.as_ref()).or_insert(0) += 1;
        }

        let mut changed = 0;
        for (text, label) in normalized.iter().zip(labels.iter_mut()) {
            if counts[text.as_ref()] >= self.config.duplicate_threshold && *label != SpamLabel::Spam {
                *label = SpamLabel::Spam;
                changed += 1;
            }
        }
        changed
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}
