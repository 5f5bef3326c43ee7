//! Model artifact storage

use crate::artifact::SpamModelArtifact;
use parking_lot::RwLock;
use reviewguard_core::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Storage backend for engine artifacts
pub trait ModelStore: Send + Sync {
    fn save(&self, artifact: &SpamModelArtifact, key: &str) -> Result<()>;

    fn load(&self, key: &str) -> Result<SpamModelArtifact>;
}

/// One JSON file per key under a root directory
#[derive(Debug, Clone)]
pub struct FileModelStore {
    root: PathBuf,
}

impl FileModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing a key
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(Error::config(format!("invalid model key {key:?}")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, artifact: &SpamModelArtifact, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(&path, artifact.to_json()?)?;

        info!(path = %path.display(), trained = artifact.is_trained(), "Saved model artifact");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<SpamModelArtifact> {
        let path = self.path_for(key)?;
        let json = std::fs::read_to_string(&path)?;
        let artifact = SpamModelArtifact::from_json(&json)?;

        info!(path = %path.display(), trained = artifact.is_trained(), "Loaded model artifact");
        Ok(artifact)
    }
}

/// In-process store keeping serialized artifacts
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    artifacts: RwLock<HashMap<String, String>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.artifacts.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl ModelStore for MemoryModelStore {
    fn save(&self, artifact: &SpamModelArtifact, key: &str) -> Result<()> {
        let json = artifact.to_json()?;
        self.artifacts.write().insert(key.to_string(), json);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<SpamModelArtifact> {
        let artifacts = self.artifacts.read();
        let json = artifacts
            .get(key)
            .ok_or_else(|| Error::config(format!("no model stored under {key:?}")))?;
        SpamModelArtifact::from_json(json)
    }
}
