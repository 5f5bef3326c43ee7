//! Dataset acquisition seam
//!
//! Providers hand back a parsed [`Dataset`]. Remote acquisition is left to
//! embedders; the crate ships a local-file provider and a fallback chain.

use crate::reader::read_dataset;
use reviewguard_core::{Dataset, Error, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// A source of review datasets
pub trait DatasetProvider: Send + Sync {
    /// Provider name for logs and error messages
    fn name(&self) -> &str;

    /// Fetch and parse the dataset
    fn fetch(&self) -> Result<Dataset>;
}

/// Reads a CSV file from disk
#[derive(Debug, Clone)]
pub struct LocalFileProvider {
    name: String,
    path: PathBuf,
}

impl LocalFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("local:{}", path.display()),
            path,
        }
    }
}

impl DatasetProvider for LocalFileProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Dataset> {
        if !self.path.exists() {
            return Err(Error::dataset(format!(
                "dataset file not found: {}",
                self.path.display()
            )));
        }
        read_dataset(&self.path)
    }
}

/// Tries providers in order and returns the first dataset fetched
pub struct FallbackProvider {
    providers: Vec<Box<dyn DatasetProvider>>,
}

impl FallbackProvider {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Append a provider to the chain
    pub fn with(mut self, provider: impl DatasetProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for FallbackProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetProvider for FallbackProvider {
    fn name(&self) -> &str {
        "fallback"
    }

    fn fetch(&self) -> Result<Dataset> {
        let mut failures = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match provider.fetch() {
                Ok(dataset) => {
                    info!(source = provider.name(), rows = dataset.len(), "Fetched dataset");
                    return Ok(dataset);
                }
                Err(e) => {
                    warn!(source = provider.name(), error = %e, "Dataset source failed");
                    failures.push(format!("{}: {e}", provider.name()));
                }
            }
        }

        Err(Error::dataset(format!(
            "all dataset sources failed [{}]",
            failures.join("; ")
        )))
    }
}
