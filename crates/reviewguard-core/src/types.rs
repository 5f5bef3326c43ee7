//! Core types for reviewguard

use serde::{Deserialize, Serialize};
use std::fmt;

/// One dataset row. Cells are stored in the column order of the owning
/// [`Dataset`]; `None` marks a missing value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub values: Vec<Option<String>>,
}

impl RawRecord {
    /// Create a record from cell values
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Cell at a column position
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }
}

/// A tabular dataset with arbitrary, unknown column names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<RawRecord>,
}

impl Dataset {
    /// Create an empty dataset with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width
    pub fn push_row(&mut self, mut record: RawRecord) {
        record.values.resize(self.columns.len(), None);
        self.rows.push(record);
    }

    /// Build a dataset from string cells; empty strings become missing values
    pub fn from_rows<S: AsRef<str>>(columns: &[&str], rows: &[Vec<S>]) -> Self {
        let mut dataset = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            let values = row
                .iter()
                .map(|cell| {
                    let cell = cell.as_ref();
                    (!cell.is_empty()).then(|| cell.to_string())
                })
                .collect();
            dataset.push_row(RawRecord::new(values));
        }
        dataset
    }

    /// Column names in declaration order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows
    pub fn rows(&self) -> &[RawRecord] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column, in row order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| row.get(index))
    }

    /// Values of a named column, or `None` if the column does not exist
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }
}

/// Role a column plays in a review dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    TextColumn,
    LabelColumn,
    RatingColumn,
}

/// Canonical 3-class sentiment scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalSentiment {
    Negative = 0,
    Neutral = 1,
    Positive = 2,
}

impl CanonicalSentiment {
    /// Map a class index onto the scale; anything outside {0,1,2} is invalid
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Negative),
            1 => Some(Self::Neutral),
            2 => Some(Self::Positive),
            _ => None,
        }
    }

    /// Class index
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }
}

impl fmt::Display for CanonicalSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tri-state spam decision shared by the rule scorer, the hybrid labeler
/// and the engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpamLabel {
    Spam,
    Real,
    Uncertain,
}

/// Verdict of the deterministic rule scorer; recomputed per query.
pub type RuleVerdict = SpamLabel;

/// Training target produced by the hybrid labeler.
pub type HybridLabel = SpamLabel;

impl SpamLabel {
    /// Integer code: 1 = spam, 0 = real, -1 = uncertain
    pub fn code(self) -> i8 {
        match self {
            Self::Spam => 1,
            Self::Real => 0,
            Self::Uncertain => -1,
        }
    }

    /// Inverse of [`SpamLabel::code`]
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(Self::Spam),
            0 => Some(Self::Real),
            -1 => Some(Self::Uncertain),
            _ => None,
        }
    }

    /// Whether the label is a definite decision
    pub fn is_certain(self) -> bool {
        !matches!(self, Self::Uncertain)
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Spam => "Spam",
            Self::Real => "Real",
            Self::Uncertain => "Uncertain",
        }
    }
}

impl fmt::Display for SpamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
