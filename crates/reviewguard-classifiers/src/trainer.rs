//! Batch training of the hybrid spam engine
//!
//! One pass over the whole corpus: rule verdicts, anomaly fit, hybrid
//! labels with the duplicate override, then the supervised fit on the
//! certain labels. The result is a new immutable engine.

use crate::anomaly::AnomalyModel;
use crate::config::EngineConfig;
use crate::engine::SpamDetectionEngine;
use crate::hybrid::HybridLabeler;
use crate::rules::RuleSpamScorer;
use crate::supervised::SupervisedSpamClassifier;
use rayon::prelude::*;
use reviewguard_core::{Error, Result, RuleVerdict, SpamLabel, TextNormalizer};
use reviewguard_dataset::Corpus;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Summary of a training run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub total: usize,
    /// Final hybrid label counts
    pub spam: usize,
    pub real: usize,
    pub uncertain: usize,
    /// Records flagged by the anomaly model
    pub anomalies: usize,
    /// Labels changed by the duplicate override
    pub duplicate_overrides: usize,
    /// Records the supervised classifier was fit on
    pub training_size: usize,
}

/// Trains a [`SpamDetectionEngine`] from a corpus
#[derive(Debug, Clone, Default)]
pub struct SpamTrainer {
    config: EngineConfig,
}

impl SpamTrainer {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Train on the raw and normalized texts of an assembled corpus
    pub fn train_corpus(&self, corpus: &Corpus) -> Result<(SpamDetectionEngine, TrainingReport)> {
        self.train(&corpus.raw_texts(), &corpus.normalized_texts())
    }

    /// Train on parallel raw/normalized texts
    pub fn train<R, N>(&self, raw: &[R], normalized: &[N]) -> Result<(SpamDetectionEngine, TrainingReport)>
    where
        R: AsRef<str> + Sync,
        N: AsRef<str> + Sync,
    {
        if raw.len() != normalized.len() {
            return Err(Error::training(format!(
                "{} raw texts but {} normalized texts",
                raw.len(),
                normalized.len()
            )));
        }
        if raw.is_empty() {
            return Err(Error::training("cannot train on an empty corpus"));
        }

        let normalizer = TextNormalizer::new(self.config.normalizer.clone())?;
        let rules = RuleSpamScorer::new(self.config.rules.clone())?;

        info!(records = raw.len(), "Scoring rule verdicts");
        let verdicts: Vec<RuleVerdict> = raw
            .par_iter()
            .zip(normalized.par_iter())
            .map(|(r, n)| rules.score(r.as_ref(), n.as_ref()))
            .collect();

        info!("Fitting anomaly model");
        let (anomaly, flags) =
            AnomalyModel::fit(normalized, &self.config.vectorizer, &self.config.anomaly)?;

        let labeler = HybridLabeler::new(self.config.training.clone());
        let hybrid = labeler.label_corpus(normalized, &verdicts, &flags)?;

        let mut report = TrainingReport {
            total: raw.len(),
            anomalies: flags.iter().filter(|&&f| f).count(),
            duplicate_overrides: hybrid.duplicate_overrides,
            ..TrainingReport::default()
        };
        for label in &hybrid.labels {
            match label {
                SpamLabel::Spam => report.spam += 1,
                SpamLabel::Real => report.real += 1,
                SpamLabel::Uncertain => report.uncertain += 1,
            }
        }
        for (label, count) in [
            (SpamLabel::Spam, report.spam),
            (SpamLabel::Real, report.real),
            (SpamLabel::Uncertain, report.uncertain),
        ] {
            metrics::counter!("reviewguard_hybrid_labels_total", "label" => label.label())
                .increment(count as u64);
        }

        info!(
            spam = report.spam,
            real = report.real,
            uncertain = report.uncertain,
            anomalies = report.anomalies,
            duplicate_overrides = report.duplicate_overrides,
            "Hybrid labels assigned"
        );

        let (documents, labels): (Vec<&str>, Vec<SpamLabel>) = normalized
            .iter()
            .zip(&hybrid.labels)
            .filter(|(_, label)| label.is_certain())
            .map(|(text, &label)| (text.as_ref(), label))
            .unzip();
        report.training_size = documents.len();

        info!(records = documents.len(), "Fitting spam classifier");
        let mut classifier = SupervisedSpamClassifier::new(
            self.config.classifier.clone(),
            self.config.vectorizer.clone(),
        );
        classifier.fit(&documents, &labels)?;

        let engine = SpamDetectionEngine::from_parts(normalizer, rules, Some(anomaly), classifier);
        Ok((engine, report))
    }
}
