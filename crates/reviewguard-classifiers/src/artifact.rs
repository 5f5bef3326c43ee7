//! Persisted form of a spam detection engine

use crate::anomaly::AnomalyModel;
use crate::config::RuleConfig;
use crate::supervised::TrainedSpamModel;
use reviewguard_core::{Error, NormalizerConfig, Result};
use serde::{Deserialize, Serialize};

/// Current artifact format version
pub const ARTIFACT_VERSION: u32 = 1;

/// Everything needed to rebuild an engine with identical outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamModelArtifact {
    pub version: u32,
    pub normalizer: NormalizerConfig,
    pub rules: RuleConfig,
    /// Present once the engine has been trained
    pub anomaly: Option<AnomalyModel>,
    pub classifier: Option<TrainedSpamModel>,
}

impl SpamModelArtifact {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an artifact, rejecting unknown format versions
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        if artifact.version != ARTIFACT_VERSION {
            return Err(Error::config(format!(
                "unsupported artifact version {} (expected {ARTIFACT_VERSION})",
                artifact.version
            )));
        }
        Ok(artifact)
    }

    pub fn is_trained(&self) -> bool {
        self.classifier.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn untrained() -> SpamModelArtifact {
        SpamModelArtifact {
            version: ARTIFACT_VERSION,
            normalizer: NormalizerConfig::without_stemming(),
            rules: RuleConfig::default(),
            anomaly: None,
            classifier: None,
        }
    }

    #[test]
    fn test_json_round_trip() {
        let json = untrained().to_json().unwrap();
        let restored = SpamModelArtifact::from_json(&json).unwrap();

        assert_eq!(restored.rules, RuleConfig::default());
        assert_eq!(restored.normalizer, NormalizerConfig::without_stemming());
        assert!(!restored.is_trained());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut artifact = untrained();
        artifact.version = 99;
        let json = artifact.to_json().unwrap();

        assert!(matches!(
            SpamModelArtifact::from_json(&json),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            SpamModelArtifact::from_json("{not json"),
            Err(Error::Serialization(_))
        ));
    }
}
