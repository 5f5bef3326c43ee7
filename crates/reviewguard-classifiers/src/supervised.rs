//! Supervised spam classifier (Tier B)
//!
//! L2-regularized logistic regression over its own TF-IDF space, fit on the
//! certain hybrid labels. The classifier has an explicit two-state lifecycle:
//! inference on an untrained classifier fails with [`Error::NotTrained`], and
//! re-fitting replaces the trained model with a new instance.

use crate::config::{ClassifierConfig, VectorizerConfig};
use crate::vectorizer::{SparseVector, TfidfVectorizer};
use rayon::prelude::*;
use reviewguard_core::{Error, Result, SpamLabel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Fitted vector space and logistic regression coefficients. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedSpamModel {
    vectorizer: TfidfVectorizer,
    weights: Vec<f64>,
    intercept: f64,
    decision_threshold: f64,
}

impl TrainedSpamModel {
    /// Fit on certain labels only; `Uncertain` in `labels` is rejected.
    pub fn fit<S: AsRef<str> + Sync>(
        documents: &[S],
        labels: &[SpamLabel],
        config: &ClassifierConfig,
        vectorizer: &VectorizerConfig,
    ) -> Result<Self> {
        if documents.len() != labels.len() {
            return Err(Error::training(format!(
                "{} documents but {} labels",
                documents.len(),
                labels.len()
            )));
        }
        if documents.is_empty() {
            return Err(Error::training("no certain labels to train on"));
        }
        if labels.iter().any(|l| !l.is_certain()) {
            return Err(Error::training("training labels must be Spam or Real"));
        }
        if labels.iter().all(|&l| l == labels[0]) {
            return Err(Error::training(format!(
                "training set holds a single class ({})",
                labels[0]
            )));
        }
        if config.c <= 0.0 {
            return Err(Error::config(format!("C must be positive, got {}", config.c)));
        }

        let vectorizer = TfidfVectorizer::fit(vectorizer.clone(), documents)?;
        let samples = vectorizer.transform_batch(documents);
        let targets: Vec<f64> = labels
            .iter()
            .map(|&l| if l == SpamLabel::Spam { 1.0 } else { 0.0 })
            .collect();
        let sample_weights = class_weights(labels, config.balanced);

        let (weights, intercept) = gradient_descent(
            &samples,
            &targets,
            &sample_weights,
            vectorizer.vocabulary_len(),
            config,
        );

        info!(
            samples = samples.len(),
            spam = targets.iter().filter(|&&t| t == 1.0).count(),
            features = weights.len(),
            "Spam classifier trained"
        );

        Ok(Self {
            vectorizer,
            weights,
            intercept,
            decision_threshold: config.decision_threshold,
        })
    }

    /// Probability of `Spam` for a normalized text
    pub fn predict_proba(&self, normalized: &str) -> f64 {
        let x = self.vectorizer.transform(normalized);
        sigmoid(x.dot(&self.weights) + self.intercept)
    }

    pub fn predict(&self, normalized: &str) -> SpamLabel {
        self.label_for(self.predict_proba(normalized))
    }

    /// Hard label for a probability
    pub fn label_for(&self, probability: f64) -> SpamLabel {
        if probability > self.decision_threshold {
            SpamLabel::Spam
        } else {
            SpamLabel::Real
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }
}

/// Per-sample weights; balanced mode uses `n / (2 * n_class)`
fn class_weights(labels: &[SpamLabel], balanced: bool) -> Vec<f64> {
    if !balanced {
        return vec![1.0; labels.len()];
    }

    let n = labels.len() as f64;
    let spam = labels.iter().filter(|&&l| l == SpamLabel::Spam).count() as f64;
    let real = n - spam;

    labels
        .iter()
        .map(|&l| {
            let count = if l == SpamLabel::Spam { spam } else { real };
            n / (2.0 * count)
        })
        .collect()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Full-batch gradient descent on the mean weighted log-loss plus
/// `|w|^2 / (2 C n)`. The intercept is not regularized.
fn gradient_descent(
    samples: &[SparseVector],
    targets: &[f64],
    sample_weights: &[f64],
    n_features: usize,
    config: &ClassifierConfig,
) -> (Vec<f64>, f64) {
    let n = samples.len() as f64;
    let l2 = 1.0 / (config.c * n);

    let mut weights = vec![0.0; n_features];
    let mut intercept = 0.0;
    let mut grad = vec![0.0; n_features];

    for iteration in 0..config.max_iter {
        for (g, w) in grad.iter_mut().zip(&weights) {
            *g = l2 * w;
        }
        let mut grad_intercept = 0.0;

        for ((x, &y), &s) in samples.iter().zip(targets).zip(sample_weights) {
            let residual = s * (sigmoid(x.dot(&weights) + intercept) - y) / n;
            grad_intercept += residual;
            for &(i, v) in x.entries() {
                grad[i] += residual * v;
            }
        }

        let max_grad = grad
            .iter()
            .fold(grad_intercept.abs(), |m, g| m.max(g.abs()));
        if max_grad <= config.tolerance {
            debug!(iterations = iteration, max_grad, "Logistic regression converged");
            return (weights, intercept);
        }

        for (w, g) in weights.iter_mut().zip(&grad) {
            *w -= config.learning_rate * g;
        }
        intercept -= config.learning_rate * grad_intercept;
    }

    warn!(
        max_iter = config.max_iter,
        "Logistic regression stopped before reaching tolerance"
    );
    (weights, intercept)
}

/// Lifecycle of the supervised classifier
#[derive(Debug, Clone, Default)]
pub enum ModelState {
    #[default]
    Untrained,
    Trained(TrainedSpamModel),
}

/// Supervised spam classifier
#[derive(Debug, Clone, Default)]
pub struct SupervisedSpamClassifier {
    config: ClassifierConfig,
    vectorizer_config: VectorizerConfig,
    state: ModelState,
}

impl SupervisedSpamClassifier {
    /// Create an untrained classifier
    pub fn new(config: ClassifierConfig, vectorizer_config: VectorizerConfig) -> Self {
        Self {
            config,
            vectorizer_config,
            state: ModelState::Untrained,
        }
    }

    /// Wrap an already fitted model
    pub fn from_trained(model: TrainedSpamModel) -> Self {
        Self {
            vectorizer_config: model.vectorizer.config().clone(),
            config: ClassifierConfig {
                decision_threshold: model.decision_threshold,
                ..ClassifierConfig::default()
            },
            state: ModelState::Trained(model),
        }
    }

    /// Fit on certain-labeled normalized texts, replacing any previous model
    pub fn fit<S: AsRef<str> + Sync>(&mut self, documents: &[S], labels: &[SpamLabel]) -> Result<()> {
        let model = TrainedSpamModel::fit(documents, labels, &self.config, &self.vectorizer_config)?;
        self.state = ModelState::Trained(model);
        Ok(())
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, ModelState::Trained(_))
    }

    /// The fitted model, or `NotTrained`
    pub fn model(&self) -> Result<&TrainedSpamModel> {
        match &self.state {
            ModelState::Trained(model) => Ok(model),
            ModelState::Untrained => Err(Error::NotTrained),
        }
    }

    pub fn predict(&self, normalized: &str) -> Result<SpamLabel> {
        Ok(self.model()?.predict(normalized))
    }

    pub fn predict_proba(&self, normalized: &str) -> Result<f64> {
        Ok(self.model()?.predict_proba(normalized))
    }

    pub fn predict_batch<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Result<Vec<SpamLabel>> {
        let model = self.model()?;
        Ok(documents
            .par_iter()
            .map(|d| model.predict(d.as_ref()))
            .collect())
    }

    pub fn predict_proba_batch<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Result<Vec<f64>> {
        let model = self.model()?;
        Ok(documents
            .par_iter()
            .map(|d| model.predict_proba(d.as_ref()))
            .collect())
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer_config() -> VectorizerConfig {
        VectorizerConfig {
            min_df: 1,
            max_df: 1.0,
            ..VectorizerConfig::default()
        }
    }

    fn training_set() -> (Vec<&'static str>, Vec<SpamLabel>) {
        let spam = [
            "kampanya url tıkla kazan",
            "indirim url hemen tıkla",
            "kazan kampanya indirim url",
            "hemen tıkla kazan url",
            "url indirim kampanya hemen",
            "tıkla url kazan indirim",
        ];
        let real = [
            "kargo hızlı geldi ürün sağlam",
            "ürün sağlam paketleme güzel",
            "paketleme özenli kargo hızlı",
            "kumaş kalitesi güzel beden uygun",
            "beden uygun kumaş yumuşak",
            "kargo geç geldi ama ürün sağlam",
        ];

        let docs: Vec<&str> = spam.iter().chain(real.iter()).copied().collect();
        let labels = std::iter::repeat(SpamLabel::Spam)
            .take(spam.len())
            .chain(std::iter::repeat(SpamLabel::Real).take(real.len()))
            .collect();
        (docs, labels)
    }

    fn trained() -> SupervisedSpamClassifier {
        let (docs, labels) = training_set();
        let mut classifier =
            SupervisedSpamClassifier::new(ClassifierConfig::default(), vectorizer_config());
        classifier.fit(&docs, &labels).unwrap();
        classifier
    }

    #[test]
    fn test_untrained_fails() {
        let classifier = SupervisedSpamClassifier::default();
        assert!(!classifier.is_trained());
        assert!(matches!(classifier.predict("x"), Err(Error::NotTrained)));
        assert!(matches!(classifier.predict_proba("x"), Err(Error::NotTrained)));
        assert!(matches!(
            classifier.predict_batch(&["x"]),
            Err(Error::NotTrained)
        ));
    }

    #[test]
    fn test_fit_and_predict() {
        let classifier = trained();
        assert!(classifier.is_trained());

        let spam = classifier.predict_proba("kampanya url indirim").unwrap();
        let real = classifier.predict_proba("kargo hızlı ürün sağlam").unwrap();
        assert!(spam > 0.5, "spam probability {spam}");
        assert!(real < 0.5, "real probability {real}");

        assert_eq!(classifier.predict("tıkla kazan url").unwrap(), SpamLabel::Spam);
        assert_eq!(classifier.predict("beden uygun kumaş").unwrap(), SpamLabel::Real);
    }

    #[test]
    fn test_batch_matches_single() {
        let classifier = trained();
        let docs = ["kampanya url", "kargo hızlı", "bilinmeyen kelime"];

        let batch = classifier.predict_proba_batch(&docs).unwrap();
        for (doc, p) in docs.iter().zip(&batch) {
            assert_eq!(*p, classifier.predict_proba(doc).unwrap());
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let a = trained();
        let b = trained();
        assert_eq!(a.model().unwrap().weights(), b.model().unwrap().weights());
        assert_eq!(a.model().unwrap().intercept(), b.model().unwrap().intercept());
    }

    #[test]
    fn test_single_class_is_training_error() {
        let mut classifier =
            SupervisedSpamClassifier::new(ClassifierConfig::default(), vectorizer_config());
        let docs = ["kargo hızlı", "ürün güzel"];
        let result = classifier.fit(&docs, &[SpamLabel::Real, SpamLabel::Real]);

        assert!(matches!(result, Err(Error::Training(_))));
        assert!(!classifier.is_trained());
    }

    #[test]
    fn test_uncertain_and_empty_rejected() {
        let mut classifier =
            SupervisedSpamClassifier::new(ClassifierConfig::default(), vectorizer_config());

        let docs = ["kargo hızlı", "ürün güzel"];
        assert!(matches!(
            classifier.fit(&docs, &[SpamLabel::Spam, SpamLabel::Uncertain]),
            Err(Error::Training(_))
        ));

        let empty: [&str; 0] = [];
        assert!(matches!(
            classifier.fit(&empty, &[]),
            Err(Error::Training(_))
        ));
    }

    #[test]
    fn test_refit_replaces_model() {
        let mut classifier = trained();
        let before = classifier.model().unwrap().weights().to_vec();

        let docs = ["aa bb", "cc dd", "aa cc"];
        let labels = [SpamLabel::Spam, SpamLabel::Real, SpamLabel::Spam];
        classifier.fit(&docs, &labels).unwrap();

        assert_ne!(classifier.model().unwrap().weights(), before.as_slice());
        assert_eq!(classifier.model().unwrap().vectorizer().vocabulary_len(), 7);
    }

    #[test]
    fn test_balanced_class_weights() {
        let labels = [SpamLabel::Spam, SpamLabel::Real, SpamLabel::Real, SpamLabel::Real];
        let weights = class_weights(&labels, true);
        assert_eq!(weights[0], 2.0);
        assert!((weights[1] - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(class_weights(&labels, false), vec![1.0; 4]);
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(3.0) > 0.95);
    }
}
