//! Unsupervised outlier detection over the TF-IDF corpus
//!
//! An isolation forest: each tree isolates a random subsample with random
//! axis-aligned cuts, and records that isolate in few cuts are outliers.
//! Trees are grown in parallel, each from its own seeded generator, so the
//! fitted forest does not depend on thread scheduling.

use crate::config::{AnomalyConfig, VectorizerConfig};
use crate::vectorizer::{SparseVector, TfidfVectorizer};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use reviewguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Subsample size used when none is configured
pub const DEFAULT_MAX_SAMPLES: usize = 256;

/// Average path length of an unsuccessful search in a binary search tree
/// of `n` items; normalizes isolation depths.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One isolation tree, stored as a node arena rooted at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    nodes: Vec<TreeNode>,
}

impl IsolationTree {
    fn grow(
        samples: &[SparseVector],
        indices: Vec<usize>,
        height_limit: usize,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow_node(samples, indices, 0, height_limit, rng);
        tree
    }

    fn grow_node(
        &mut self,
        samples: &[SparseVector],
        indices: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            size: indices.len(),
        });

        if depth >= height_limit || indices.len() <= 1 {
            return id;
        }

        let ranges = feature_ranges(samples, &indices);
        if ranges.is_empty() {
            return id;
        }

        let pick = rng.gen_range(0..ranges.len());
        let Some((&feature, &(low, high))) = ranges.iter().nth(pick) else {
            return id;
        };
        let threshold = rng.gen_range(low..high);

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| samples[i].get(feature) <= threshold);

        let left = self.grow_node(samples, left, depth + 1, height_limit, rng);
        let right = self.grow_node(samples, right, depth + 1, height_limit, rng);
        self.nodes[id] = TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        };

        id
    }

    /// Isolation depth of a sample, extended by the expected depth of the
    /// unresolved leaf population
    pub fn path_length(&self, sample: &SparseVector) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;

        while let Some(current) = self.nodes.get(node) {
            match *current {
                TreeNode::Leaf { size } => return depth + average_path_length(size),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample.get(feature) <= threshold {
                        left
                    } else {
                        right
                    };
                    depth += 1.0;
                }
            }
        }

        depth
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Per-feature (min, max) over a node's samples, non-constant features only.
/// Features absent from some samples include the implicit zero.
fn feature_ranges(samples: &[SparseVector], indices: &[usize]) -> BTreeMap<usize, (f64, f64)> {
    let mut seen: BTreeMap<usize, (f64, f64, usize)> = BTreeMap::new();

    for &i in indices {
        for &(feature, value) in samples[i].entries() {
            let entry = seen.entry(feature).or_insert((value, value, 0));
            entry.0 = entry.0.min(value);
            entry.1 = entry.1.max(value);
            entry.2 += 1;
        }
    }

    seen.into_iter()
        .filter_map(|(feature, (mut low, mut high, present))| {
            if present < indices.len() {
                low = low.min(0.0);
                high = high.max(0.0);
            }
            (high > low).then_some((feature, (low, high)))
        })
        .collect()
}

/// Linear-interpolated percentile, `q` in [0, 100]
fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Fitted isolation forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    max_samples: usize,
    /// Score below which a sample is an outlier
    offset: f64,
}

impl IsolationForest {
    /// Fit the forest and flag outliers among the training samples
    pub fn fit_predict(samples: &[SparseVector], config: &AnomalyConfig) -> Result<(Self, Vec<bool>)> {
        if samples.is_empty() {
            return Err(Error::training("cannot fit an anomaly model on an empty corpus"));
        }
        if config.n_estimators == 0 {
            return Err(Error::config("n_estimators must be at least 1"));
        }
        if !(config.contamination > 0.0 && config.contamination <= 0.5) {
            return Err(Error::config(format!(
                "contamination must be in (0, 0.5], got {}",
                config.contamination
            )));
        }

        let max_samples = config
            .max_samples
            .unwrap_or(DEFAULT_MAX_SAMPLES)
            .clamp(1, samples.len());
        let height_limit = (max_samples.max(2) as f64).log2().ceil() as usize;

        let trees: Vec<IsolationTree> = (0..config.n_estimators)
            .into_par_iter()
            .map(|tree_index| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(tree_index as u64));
                let indices = rand::seq::index::sample(&mut rng, samples.len(), max_samples).into_vec();
                IsolationTree::grow(samples, indices, height_limit, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            max_samples,
            offset: 0.0,
        };

        let scores = forest.score_samples(samples);
        forest.offset = percentile(&scores, 100.0 * config.contamination);
        let flags: Vec<bool> = scores.iter().map(|&s| s < forest.offset).collect();

        debug!(
            trees = forest.trees.len(),
            max_samples,
            height_limit,
            offset = forest.offset,
            "Fitted isolation forest"
        );

        Ok((forest, flags))
    }

    /// Opposite of the anomaly score: lower means more abnormal
    pub fn score_sample(&self, sample: &SparseVector) -> f64 {
        let mean_depth = self
            .trees
            .iter()
            .map(|tree| tree.path_length(sample))
            .sum::<f64>()
            / self.trees.len().max(1) as f64;

        let normalizer = match average_path_length(self.max_samples) {
            c if c > 0.0 => c,
            _ => 1.0,
        };

        -(2f64.powf(-mean_depth / normalizer))
    }

    pub fn score_samples(&self, samples: &[SparseVector]) -> Vec<f64> {
        samples.par_iter().map(|s| self.score_sample(s)).collect()
    }

    /// Shifted score; negative values are outliers
    pub fn decision_function(&self, sample: &SparseVector) -> f64 {
        self.score_sample(sample) - self.offset
    }

    pub fn is_outlier(&self, sample: &SparseVector) -> bool {
        self.decision_function(sample) < 0.0
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }
}

/// TF-IDF space plus isolation forest, fit once over the whole corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyModel {
    vectorizer: TfidfVectorizer,
    forest: IsolationForest,
}

impl AnomalyModel {
    /// Fit over normalized texts; returns the model and one flag per text
    pub fn fit<S: AsRef<str> + Sync>(
        documents: &[S],
        vectorizer: &VectorizerConfig,
        anomaly: &AnomalyConfig,
    ) -> Result<(Self, Vec<bool>)> {
        let vectorizer = TfidfVectorizer::fit(vectorizer.clone(), documents)?;
        let vectors = vectorizer.transform_batch(documents);
        let (forest, flags) = IsolationForest::fit_predict(&vectors, anomaly)?;

        let flagged = flags.iter().filter(|&&f| f).count();
        info!(
            documents = documents.len(),
            vocabulary = vectorizer.vocabulary_len(),
            flagged,
            "Anomaly model trained"
        );

        Ok((Self { vectorizer, forest }, flags))
    }

    /// Decision score of a normalized text; negative is anomalous
    pub fn score(&self, normalized: &str) -> f64 {
        self.forest.decision_function(&self.vectorizer.transform(normalized))
    }

    pub fn is_anomalous(&self, normalized: &str) -> bool {
        self.score(normalized) < 0.0
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn forest(&self) -> &IsolationForest {
        &self.forest
    }
}
