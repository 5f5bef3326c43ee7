//! Runtime spam detection facade
//!
//! Normalizes a query, scores it with the rules and, once trained, with the
//! supervised classifier. The engine holds only immutable fitted state, so
//! one instance can serve concurrent callers behind an `Arc`.

use crate::anomaly::AnomalyModel;
use crate::artifact::{SpamModelArtifact, ARTIFACT_VERSION};
use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier, ClassifierTier};
use crate::config::EngineConfig;
use crate::rules::RuleSpamScorer;
use crate::supervised::{ModelState, SupervisedSpamClassifier};
use async_trait::async_trait;
use reviewguard_core::{Result, RuleVerdict, SpamLabel, TextNormalizer};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Instant;
use tracing::info;

/// Outcome of analyzing one review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpamAnalysis {
    /// Spam probability; 1.0 or 0.0 from the rules when untrained
    pub probability: f64,
    pub verdict: SpamLabel,
    pub rule_verdict: RuleVerdict,
    /// Triggered indicators, or a single "normal review" entry
    pub explanation: Vec<String>,
}

impl SpamAnalysis {
    pub fn is_spam(&self) -> bool {
        self.verdict == SpamLabel::Spam
    }

    /// Display label of the verdict
    pub fn label(&self) -> &'static str {
        self.verdict.label()
    }
}

/// Hybrid spam detection engine
pub struct SpamDetectionEngine {
    normalizer: TextNormalizer,
    rules: RuleSpamScorer,
    anomaly: Option<AnomalyModel>,
    classifier: SupervisedSpamClassifier,
}

impl SpamDetectionEngine {
    /// Untrained engine: verdicts come from the rules alone
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            normalizer: TextNormalizer::new(config.normalizer.clone())?,
            rules: RuleSpamScorer::new(config.rules.clone())?,
            anomaly: None,
            classifier: SupervisedSpamClassifier::new(
                config.classifier.clone(),
                config.vectorizer.clone(),
            ),
        })
    }

    pub(crate) fn from_parts(
        normalizer: TextNormalizer,
        rules: RuleSpamScorer,
        anomaly: Option<AnomalyModel>,
        classifier: SupervisedSpamClassifier,
    ) -> Self {
        Self {
            normalizer,
            rules,
            anomaly,
            classifier,
        }
    }

    /// Analyze one review. `normalized` is computed when not supplied.
    pub fn analyze(&self, raw: &str, normalized: Option<&str>) -> SpamAnalysis {
        let normalized = match normalized {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(self.normalizer.normalize(raw)),
        };

        let features = self.rules.features(raw, &normalized);
        let rule_verdict = self.rules.verdict(&features);

        let (probability, verdict) = match self.classifier.state() {
            ModelState::Trained(model) => {
                let probability = model.predict_proba(&normalized);
                (probability, model.label_for(probability))
            }
            ModelState::Untrained => {
                let probability = if rule_verdict == SpamLabel::Spam { 1.0 } else { 0.0 };
                (probability, rule_verdict)
            }
        };

        metrics::counter!("reviewguard_analyses_total", "verdict" => verdict.label()).increment(1);

        SpamAnalysis {
            probability,
            verdict,
            rule_verdict,
            explanation: self.rules.explain(&features),
        }
    }

    /// Analyze many reviews, normalizing each
    pub fn analyze_batch<S: AsRef<str>>(&self, raws: &[S]) -> Vec<SpamAnalysis> {
        raws.iter().map(|raw| self.analyze(raw.as_ref(), None)).collect()
    }

    pub fn is_trained(&self) -> bool {
        self.classifier.is_trained()
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn rules(&self) -> &RuleSpamScorer {
        &self.rules
    }

    /// Anomaly model fit during training, if any
    pub fn anomaly(&self) -> Option<&AnomalyModel> {
        self.anomaly.as_ref()
    }

    pub fn classifier(&self) -> &SupervisedSpamClassifier {
        &self.classifier
    }

    /// Snapshot the engine for persistence
    pub fn to_artifact(&self) -> SpamModelArtifact {
        SpamModelArtifact {
            version: ARTIFACT_VERSION,
            normalizer: self.normalizer.config().clone(),
            rules: self.rules.config().clone(),
            anomaly: self.anomaly.clone(),
            classifier: self.classifier.model().ok().cloned(),
        }
    }

    /// Rebuild an engine from a persisted artifact
    pub fn from_artifact(artifact: SpamModelArtifact) -> Result<Self> {
        let normalizer = TextNormalizer::new(artifact.normalizer)?;
        let rules = RuleSpamScorer::new(artifact.rules)?;
        let classifier = match artifact.classifier {
            Some(model) => SupervisedSpamClassifier::from_trained(model),
            None => SupervisedSpamClassifier::default(),
        };

        info!(
            trained = classifier.is_trained(),
            anomaly = artifact.anomaly.is_some(),
            "Spam engine restored from artifact"
        );

        Ok(Self::from_parts(normalizer, rules, artifact.anomaly, classifier))
    }
}

impl std::fmt::Debug for SpamDetectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpamDetectionEngine")
            .field("normalizer", &self.normalizer)
            .field("rules", &self.rules)
            .field("trained", &self.is_trained())
            .finish()
    }
}

#[async_trait]
impl Classifier for SpamDetectionEngine {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();
        let analysis = self.analyze(text, None);
        let probability = analysis.probability as f32;

        Ok(ClassificationResult {
            label: analysis.verdict,
            score: probability,
            rule_verdict: Some(analysis.rule_verdict),
            indicators: analysis.explanation,
            metadata: ClassificationMetadata {
                model: Some(self.name().to_string()),
                all_scores: vec![
                    (SpamLabel::Spam, probability),
                    (SpamLabel::Real, 1.0 - probability),
                ],
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        "hybrid-spam-engine"
    }

    fn tier(&self) -> ClassifierTier {
        if self.is_trained() {
            ClassifierTier::B
        } else {
            ClassifierTier::A
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VectorizerConfig;
    use crate::rules::NORMAL_INDICATOR;
    use reviewguard_core::NormalizerConfig;
    use std::sync::Arc;

    fn rules_only() -> SpamDetectionEngine {
        let config = EngineConfig {
            normalizer: NormalizerConfig::without_stemming(),
            ..EngineConfig::default()
        };
        SpamDetectionEngine::new(&config).unwrap()
    }

    fn trained() -> SpamDetectionEngine {
        let mut classifier = SupervisedSpamClassifier::new(
            Default::default(),
            VectorizerConfig {
                min_df: 1,
                max_df: 1.0,
                ..VectorizerConfig::default()
            },
        );
        let docs = [
            "kampanya <url> tıkla",
            "indirim <url> kazan",
            "kazan kampanya <url>",
            "kargo hızlı geldi",
            "ürün sağlam geldi",
            "paketleme özenli kargo",
        ];
        let labels = [
            SpamLabel::Spam,
            SpamLabel::Spam,
            SpamLabel::Spam,
            SpamLabel::Real,
            SpamLabel::Real,
            SpamLabel::Real,
        ];
        classifier.fit(&docs, &labels).unwrap();

        SpamDetectionEngine::from_parts(
            TextNormalizer::without_stemming().unwrap(),
            RuleSpamScorer::default(),
            None,
            classifier,
        )
    }

    #[test]
    fn test_untrained_uses_rule_verdict() {
        let engine = rules_only();
        assert!(!engine.is_trained());

        let spam = engine.analyze("Harika ürün, hemen alın: http://bit.ly/abc", None);
        assert_eq!(spam.rule_verdict, SpamLabel::Spam);
        assert_eq!(spam.verdict, SpamLabel::Spam);
        assert_eq!(spam.probability, 1.0);
        assert!(spam.is_spam());

        let uncertain = engine.analyze("Çok güzel!!!!", None);
        assert_eq!(uncertain.verdict, SpamLabel::Uncertain);
        assert_eq!(uncertain.probability, 0.0);
    }

    #[test]
    fn test_supplied_normalized_text_is_used() {
        let engine = rules_only();
        let analysis = engine.analyze("sade bir yorum", Some("bak <url>"));
        assert_eq!(analysis.rule_verdict, SpamLabel::Spam);
    }

    #[test]
    fn test_explanation() {
        let engine = rules_only();
        let normal = engine.analyze("Ürün açıklamada yazdığı gibi geldi", None);
        assert_eq!(normal.explanation, vec![NORMAL_INDICATOR.to_string()]);
        assert_eq!(normal.label(), "Real");
    }

    #[test]
    fn test_trained_uses_classifier() {
        let engine = trained();
        assert!(engine.is_trained());

        let analysis = engine.analyze("Kampanya http://x.co tıkla", None);
        assert_eq!(analysis.rule_verdict, SpamLabel::Spam);
        assert!(analysis.probability > 0.5);
        assert_eq!(analysis.verdict, SpamLabel::Spam);

        let analysis = engine.analyze("kargo hızlı geldi", None);
        assert!(analysis.probability < 0.5);
        assert_eq!(analysis.verdict, SpamLabel::Real);
    }

    #[test]
    fn test_artifact_round_trip() {
        let engine = trained();
        let json = engine.to_artifact().to_json().unwrap();
        let restored =
            SpamDetectionEngine::from_artifact(SpamModelArtifact::from_json(&json).unwrap()).unwrap();

        for raw in ["kampanya http://x.co", "kargo hızlı geldi", "HARİKA!!!!"] {
            assert_eq!(restored.analyze(raw, None), engine.analyze(raw, None));
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let engine = Arc::new(rules_only());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.analyze("bak www.site.com", None).verdict)
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), SpamLabel::Spam);
        }
    }

    #[tokio::test]
    async fn test_classifier_trait() {
        let engine = rules_only();
        assert_eq!(engine.tier(), ClassifierTier::A);

        let result = engine.classify("bilgi için www.ornek.com").await.unwrap();
        assert_eq!(result.label, SpamLabel::Spam);
        assert!(result.is_spam());
        assert!(result.exceeds_threshold(0.5));
        assert_eq!(result.rule_verdict, Some(SpamLabel::Spam));
        assert_eq!(result.score_for(SpamLabel::Real), Some(0.0));
        assert_eq!(result.metadata.model.as_deref(), Some("hybrid-spam-engine"));
        assert!(!result.indicators.is_empty());
        assert!(!result.indicators.contains(&NORMAL_INDICATOR.to_string()));

        let normal = engine.classify("Ürün açıklamada yazdığı gibi geldi").await.unwrap();
        assert_eq!(normal.label, SpamLabel::Real);
        assert_eq!(normal.rule_verdict, Some(SpamLabel::Real));
        assert_eq!(normal.indicators, vec![NORMAL_INDICATOR.to_string()]);

        assert_eq!(trained().tier(), ClassifierTier::B);
    }
}
