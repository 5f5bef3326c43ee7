//! Sparse TF-IDF vector space over word n-grams

use crate::config::VectorizerConfig;
use rayon::prelude::*;
use regex::Regex;
use reviewguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

/// Sparse vector with entries sorted by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from entries already sorted by index
    pub fn from_sorted(entries: Vec<(usize, f64)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at an index; implicit zeros read as 0.0
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Dot product with a dense vector
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|&(i, v)| v * dense.get(i).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt()
    }
}

/// Fitted TF-IDF vectorizer.
///
/// Terms are word n-grams. The vocabulary is indexed alphabetically, idf is
/// smoothed (`ln((1 + n) / (1 + df)) + 1`) and every output vector is
/// L2-normalized.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorizerState", into = "VectorizerState")]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    tokenizer: Regex,
}

/// Persisted form of a fitted vectorizer
#[derive(Serialize, Deserialize)]
struct VectorizerState {
    config: VectorizerConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and idf weights from a corpus
    pub fn fit<S: AsRef<str> + Sync>(config: VectorizerConfig, documents: &[S]) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::training("cannot fit a vectorizer on an empty corpus"));
        }
        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::config(format!(
                "invalid n-gram range ({min_n}, {max_n})"
            )));
        }

        let tokenizer = compile_tokenizer(&config.token_pattern)?;
        let n_docs = documents.len();

        let per_document: Vec<HashMap<String, usize>> = documents
            .par_iter()
            .map(|doc| {
                let mut counts = HashMap::new();
                for term in analyze(&tokenizer, config.ngram_range, doc.as_ref()) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        // term -> (total count, document count)
        let mut stats: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for counts in per_document {
            for (term, count) in counts {
                let entry = stats.entry(term).or_insert((0, 0));
                entry.0 += count;
                entry.1 += 1;
            }
        }

        let max_doc_count = config.max_df * n_docs as f64;
        if max_doc_count < config.min_df as f64 {
            return Err(Error::training(format!(
                "max_df {} covers fewer documents than min_df {} for {n_docs} documents",
                config.max_df, config.min_df
            )));
        }

        let mut kept: Vec<(String, (usize, usize))> = stats
            .into_iter()
            .filter(|(_, (_, df))| *df >= config.min_df && (*df as f64) <= max_doc_count)
            .collect();

        if let Some(limit) = config.max_features {
            if kept.len() > limit {
                // stable: equal counts stay in alphabetical order
                kept.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));
                kept.truncate(limit);
                kept.sort_by(|a, b| a.0.cmp(&b.0));
            }
        }

        if kept.is_empty() {
            return Err(Error::training(
                "empty vocabulary: no term survived document-frequency pruning",
            ));
        }

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (index, (term, (_, df))) in kept.into_iter().enumerate() {
            idf.push(((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        debug!(
            documents = n_docs,
            vocabulary = vocabulary.len(),
            "Fitted TF-IDF vectorizer"
        );

        Ok(Self {
            config,
            vocabulary,
            idf,
            tokenizer,
        })
    }

    /// Vectorize one document
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(&self.tokenizer, self.config.ngram_range, document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = entries.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut entries {
                *v /= norm;
            }
        }

        SparseVector::from_sorted(entries)
    }

    /// Vectorize many documents in parallel, preserving order
    pub fn transform_batch<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents
            .par_iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}

impl fmt::Debug for TfidfVectorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfidfVectorizer")
            .field("config", &self.config)
            .field("vocabulary_len", &self.vocabulary.len())
            .finish()
    }
}

impl TryFrom<VectorizerState> for TfidfVectorizer {
    type Error = Error;

    fn try_from(state: VectorizerState) -> Result<Self> {
        if state.vocabulary.len() != state.idf.len()
            || state.vocabulary.values().any(|&i| i >= state.idf.len())
        {
            return Err(Error::internal("vectorizer vocabulary and idf weights disagree"));
        }
        let tokenizer = compile_tokenizer(&state.config.token_pattern)?;
        Ok(Self {
            config: state.config,
            vocabulary: state.vocabulary,
            idf: state.idf,
            tokenizer,
        })
    }
}

impl From<TfidfVectorizer> for VectorizerState {
    fn from(vectorizer: TfidfVectorizer) -> Self {
        Self {
            config: vectorizer.config,
            vocabulary: vectorizer.vocabulary,
            idf: vectorizer.idf,
        }
    }
}

fn compile_tokenizer(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::config(format!("Failed to compile token pattern: {e}")))
}

/// Tokens and their n-grams, in document order
fn analyze(tokenizer: &Regex, (min_n, max_n): (usize, usize), document: &str) -> Vec<String> {
    let tokens: Vec<&str> = tokenizer.find_iter(document).map(|m| m.as_str()).collect();
    let mut terms = Vec::new();

    for n in min_n..=max_n.min(tokens.len()) {
        if n == 1 {
            terms.extend(tokens.iter().map(|t| t.to_string()));
        } else {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn distinct_terms(tokenizer: &Regex, range: (usize, usize), document: &str) -> HashSet<String> {
        analyze(tokenizer, range, document).into_iter().collect()
    }

    fn config(min_df: usize) -> VectorizerConfig {
        VectorizerConfig {
            min_df,
            max_df: 1.0,
            ..VectorizerConfig::default()
        }
    }

    #[test]
    fn test_analyze_ngrams() {
        let tokenizer = compile_tokenizer(r"\b\w\w+\b").unwrap();
        let terms = distinct_terms(&tokenizer, (1, 2), "çok iyi bir ürün, a b");

        assert!(terms.contains("çok"));
        assert!(terms.contains("çok iyi"));
        assert!(terms.contains("bir ürün"));
        // single-character tokens are dropped
        assert!(!terms.contains("a"));
        assert_eq!(terms.len(), 7);
    }

    #[test]
    fn test_vocabulary_is_alphabetical() {
        let docs = ["kargo hızlı", "kargo yavaş", "ürün güzel"];
        let vectorizer = TfidfVectorizer::fit(config(1), &docs).unwrap();

        let terms: Vec<&String> = vectorizer.vocabulary().keys().collect();
        let mut sorted = terms.clone();
        sorted.sort();
        assert_eq!(terms, sorted);
        assert_eq!(vectorizer.vocabulary()["güzel"] + 1, vectorizer.vocabulary()["hızlı"]);
    }

    #[test]
    fn test_smooth_idf() {
        let docs = ["kargo hızlı", "kargo yavaş", "ürün güzel"];
        let vectorizer = TfidfVectorizer::fit(config(1), &docs).unwrap();

        let kargo = vectorizer.vocabulary()["kargo"];
        let urun = vectorizer.vocabulary()["ürün"];
        assert!((vectorizer.idf()[kargo] - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((vectorizer.idf()[urun] - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_min_df_prunes() {
        let docs = ["kargo hızlı", "kargo yavaş", "kargo geldi"];
        let vectorizer = TfidfVectorizer::fit(config(2), &docs).unwrap();
        assert_eq!(vectorizer.vocabulary_len(), 1);
        assert!(vectorizer.vocabulary().contains_key("kargo"));
    }

    #[test]
    fn test_max_df_prunes() {
        let docs = ["kargo hızlı", "kargo yavaş", "kargo geldi", "ürün güzel"];
        let cfg = VectorizerConfig {
            min_df: 1,
            max_df: 0.5,
            ..VectorizerConfig::default()
        };
        let vectorizer = TfidfVectorizer::fit(cfg, &docs).unwrap();
        assert!(!vectorizer.vocabulary().contains_key("kargo"));
        assert!(vectorizer.vocabulary().contains_key("hızlı"));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let docs = ["aa bb", "aa cc", "aa bb", "dd"];
        let cfg = VectorizerConfig {
            min_df: 1,
            max_df: 1.0,
            ngram_range: (1, 1),
            max_features: Some(2),
            ..VectorizerConfig::default()
        };
        let vectorizer = TfidfVectorizer::fit(cfg, &docs).unwrap();
        let terms: Vec<&str> = vectorizer.vocabulary().keys().map(|s| s.as_str()).collect();
        assert_eq!(terms, vec!["aa", "bb"]);
    }

    #[test]
    fn test_empty_vocabulary_is_training_error() {
        let docs = ["a b", "c"];
        assert!(matches!(
            TfidfVectorizer::fit(config(1), &docs),
            Err(Error::Training(_))
        ));

        let empty: [&str; 0] = [];
        assert!(matches!(
            TfidfVectorizer::fit(config(1), &empty),
            Err(Error::Training(_))
        ));
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let docs = ["kargo hızlı geldi", "kargo yavaş", "ürün güzel"];
        let vectorizer = TfidfVectorizer::fit(config(1), &docs).unwrap();

        let v = vectorizer.transform("kargo hızlı geldi kargo");
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert!(v.get(vectorizer.vocabulary()["kargo"]) > 0.0);

        let unknown = vectorizer.transform("tamamen farklı kelimeler");
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let docs = ["kargo hızlı geldi", "kargo yavaş", "ürün güzel"];
        let vectorizer = TfidfVectorizer::fit(config(1), &docs).unwrap();

        let json = serde_json::to_string(&vectorizer).unwrap();
        let restored: TfidfVectorizer = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.vocabulary(), vectorizer.vocabulary());
        assert_eq!(
            restored.transform("kargo hızlı"),
            vectorizer.transform("kargo hızlı")
        );
    }
}
