//! Column-role inference for datasets of unknown shape
//!
//! Each role is resolved by column name first. When no name matches, the
//! text and label roles fall back to scoring column contents; the rating
//! role falls back to the first column holding a 1..5 value set.

use crate::config::SchemaConfig;
use crate::reader::parse_number;
use reviewguard_core::{ColumnRole, Dataset};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// How the label column was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMethod {
    NameMatch,
    ContentAnalysis,
    None,
}

impl fmt::Display for LabelMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NameMatch => "name_match",
            Self::ContentAnalysis => "content_analysis",
            Self::None => "none",
        })
    }
}

/// Result of schema inference; every role may be absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInference {
    pub text_column: Option<String>,
    pub label_column: Option<String>,
    pub label_method: LabelMethod,
    pub rating_column: Option<String>,
}

impl SchemaInference {
    /// Column assigned to a role
    pub fn column(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::TextColumn => self.text_column.as_deref(),
            ColumnRole::LabelColumn => self.label_column.as_deref(),
            ColumnRole::RatingColumn => self.rating_column.as_deref(),
        }
    }
}

/// Identifies text, label and rating columns
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    config: SchemaConfig,
}

impl SchemaInferrer {
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Infer all column roles
    pub fn infer(&self, dataset: &Dataset) -> SchemaInference {
        let text_column = self.find_text_column(dataset);
        let (label_column, label_method) = self.find_label_column(dataset);
        let rating_column = self.find_rating_column(dataset);

        info!(
            text = ?text_column,
            label = ?label_column,
            method = %label_method,
            rating = ?rating_column,
            "Inferred dataset schema"
        );

        SchemaInference {
            text_column,
            label_column,
            label_method,
            rating_column,
        }
    }

    /// Review text column: name match, else the highest content score
    pub fn find_text_column(&self, dataset: &Dataset) -> Option<String> {
        if let Some(name) = match_column_name(dataset.columns(), &self.config.text_keywords) {
            return Some(name);
        }

        let mut best: Option<(usize, f64)> = None;
        for index in 0..dataset.columns().len() {
            if !is_string_column(dataset, index) {
                continue;
            }
            let Some(score) = self.text_score(dataset.column_values(index)) else {
                continue;
            };
            debug!(column = %dataset.columns()[index], score, "Text column candidate");
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        best.map(|(index, _)| dataset.columns()[index].clone())
    }

    /// Sentiment label column and how it was found
    pub fn find_label_column(&self, dataset: &Dataset) -> (Option<String>, LabelMethod) {
        if let Some(name) = match_column_name(dataset.columns(), &self.config.label_keywords) {
            return (Some(name), LabelMethod::NameMatch);
        }

        let mut best: Option<(usize, f64)> = None;
        for index in 0..dataset.columns().len() {
            let score = self.label_score(dataset.column_values(index));
            debug!(column = %dataset.columns()[index], score, "Label column candidate");
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, score)) if score >= self.config.label_adoption_threshold => (
                Some(dataset.columns()[index].clone()),
                LabelMethod::ContentAnalysis,
            ),
            _ => (None, LabelMethod::None),
        }
    }

    /// Star rating column: name match, else the first 1..5 column
    pub fn find_rating_column(&self, dataset: &Dataset) -> Option<String> {
        if let Some(name) = match_column_name(dataset.columns(), &self.config.rating_keywords) {
            return Some(name);
        }

        (0..dataset.columns().len())
            .find(|&index| {
                let numeric = distinct_numbers(dataset.column_values(index).flatten());
                is_subset(&numeric, &[1.0, 2.0, 3.0, 4.0, 5.0]) && numeric.len() >= 3
            })
            .map(|index| dataset.columns()[index].clone())
    }

    /// `mean(length) * ln(1 + distinct)` over a sample of non-missing values.
    /// Columns with too few values do not qualify.
    pub fn text_score<'a>(&self, values: impl IntoIterator<Item = Option<&'a str>>) -> Option<f64> {
        let sample: Vec<&str> = values
            .into_iter()
            .flatten()
            .take(self.config.text_sample_size)
            .collect();

        if sample.len() < self.config.min_text_samples || sample.is_empty() {
            return None;
        }

        let total_chars: usize = sample.iter().map(|v| v.chars().count()).sum();
        let mean_length = total_chars as f64 / sample.len() as f64;
        let distinct = sample.iter().collect::<HashSet<_>>().len();

        Some(mean_length * (distinct as f64).ln_1p())
    }

    /// Heuristic likelihood that a column holds sentiment labels
    pub fn label_score<'a>(&self, values: impl IntoIterator<Item = Option<&'a str>>) -> f64 {
        let present: Vec<&str> = values.into_iter().flatten().collect();
        if present.len() < self.config.min_label_rows {
            return -1.0;
        }

        let numeric = distinct_numbers(present.iter().copied());

        let mut seen = HashSet::new();
        let textual: Vec<String> = present
            .iter()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| seen.insert(v.clone()))
            .collect();

        let mut score = 0.0;

        if is_subset(&numeric, &[0.0, 1.0, 2.0]) && numeric.len() >= 2 {
            score += 5.0;
        }
        if is_subset(&numeric, &[-1.0, 0.0, 1.0]) && numeric.len() >= 2 {
            score += 4.0;
        }
        if is_subset(&numeric, &[1.0, 2.0, 3.0, 4.0, 5.0]) && numeric.len() >= 3 {
            score += 2.0;
        }

        let inspected = &textual[..textual.len().min(self.config.label_text_sample)];
        let families = self
            .config
            .sentiment_families
            .iter()
            .filter(|family| {
                inspected
                    .iter()
                    .any(|value| family.iter().any(|keyword| value.contains(keyword.as_str())))
            })
            .count();

        if families >= 2 && textual.len() <= self.config.max_label_values {
            score += 4.0;
        }

        if textual.len() > self.config.free_text_distinct
            && numeric.len() > self.config.free_text_distinct
        {
            score -= 5.0;
        }

        if (2..=6).contains(&textual.len()) {
            score += 1.0;
        }

        score
    }
}

/// Exact (case-insensitive) match in keyword order, else the first column
/// whose name contains any keyword.
fn match_column_name(columns: &[String], keywords: &[String]) -> Option<String> {
    let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();

    for keyword in keywords {
        if let Some(index) = lowered.iter().position(|c| c == keyword) {
            return Some(columns[index].clone());
        }
    }

    lowered
        .iter()
        .position(|c| keywords.iter().any(|k| c.contains(k.as_str())))
        .map(|index| columns[index].clone())
}

/// A column is string-typed when any non-missing value is non-numeric
fn is_string_column(dataset: &Dataset, index: usize) -> bool {
    dataset
        .column_values(index)
        .flatten()
        .any(|v| parse_number(v).is_none())
}

fn distinct_numbers<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<f64> {
    let mut numbers: Vec<f64> = values.into_iter().filter_map(parse_number).collect();
    numbers.sort_by(f64::total_cmp);
    numbers.dedup();
    numbers
}

fn is_subset(values: &[f64], allowed: &[f64]) -> bool {
    values.iter().all(|v| allowed.contains(v))
}
