//! Reviewguard Classifiers
//!
//! Hybrid spam detection for customer reviews.
//!
//! Classifiers are organized into tiers based on latency budgets:
//! - Tier A (<2ms): the deterministic rule scorer
//! - Tier B (<5ms): TF-IDF plus logistic regression, trained on the
//!   consensus of the rules and an isolation forest
//!
//! Training is a single batch pass ([`SpamTrainer`]); the resulting
//! [`SpamDetectionEngine`] is immutable and answers single-review queries.

pub mod anomaly;
pub mod artifact;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod hybrid;
pub mod rules;
pub mod store;
pub mod supervised;
pub mod trainer;
pub mod vectorizer;

pub use anomaly::{AnomalyModel, IsolationForest};
pub use artifact::{SpamModelArtifact, ARTIFACT_VERSION};
pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier, ClassifierTier};
pub use config::{
    AnomalyConfig, ClassifierConfig, EngineConfig, RuleConfig, TrainingConfig, VectorizerConfig,
};
pub use engine::{SpamAnalysis, SpamDetectionEngine};
pub use hybrid::{HybridLabeler, HybridLabels};
pub use rules::{Indicator, RuleFeatures, RuleSpamScorer};
pub use store::{FileModelStore, MemoryModelStore, ModelStore};
pub use supervised::{ModelState, SupervisedSpamClassifier, TrainedSpamModel};
pub use trainer::{SpamTrainer, TrainingReport};
pub use vectorizer::{SparseVector, TfidfVectorizer};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{SpamAnalysis, SpamDetectionEngine};
    pub use crate::store::{FileModelStore, ModelStore};
    pub use crate::trainer::{SpamTrainer, TrainingReport};
}
