//! Deterministic rule-based spam scorer (Tier A)
//!
//! Scores surface statistics of a review: links and contacts, exclamation
//! and emoji density, shouting, and short boilerplate phrases. Long, specific
//! complaints are exempt and always come back as `Real`.

use crate::config::RuleConfig;
use aho_corasick::AhoCorasick;
use reviewguard_core::{Error, Result, RuleVerdict};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Surface features computed from a raw/normalized text pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleFeatures {
    pub has_placeholder: bool,
    pub exclamation_count: usize,
    pub emoji_count: usize,
    /// Uppercase letters over all letters of the raw text; 0 without letters
    pub uppercase_ratio: f64,
    /// Raw length in characters
    pub raw_length: usize,
    /// Normalized length in characters
    pub normalized_length: usize,
    pub token_count: usize,
    pub has_generic_phrase: bool,
    pub has_complaint_keyword: bool,
}

/// Human-readable spam indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Placeholder,
    ExcessiveExclamation,
    ExcessiveEmoji,
    MajorityUppercase,
}

impl Indicator {
    pub fn description(self) -> &'static str {
        match self {
            Self::Placeholder => "contains a link, e-mail address or phone number",
            Self::ExcessiveExclamation => "too many exclamation marks",
            Self::ExcessiveEmoji => "too many emoji",
            Self::MajorityUppercase => "mostly uppercase",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Explanation entry used when no indicator fired
pub const NORMAL_INDICATOR: &str = "normal review";

/// Rule-based spam scorer
pub struct RuleSpamScorer {
    config: RuleConfig,
    placeholders: AhoCorasick,
    generic_phrases: AhoCorasick,
    complaint_keywords: AhoCorasick,
}

impl RuleSpamScorer {
    /// Create a scorer from its configuration
    pub fn new(config: RuleConfig) -> Result<Self> {
        let build = |patterns: Vec<&String>, what: &str| {
            AhoCorasick::new(patterns)
                .map_err(|e| Error::classifier(format!("Failed to build {what} matcher: {e}")))
        };

        let placeholders = build(config.placeholders.iter().collect(), "placeholder")?;
        let generic_phrases = build(
            config
                .generic_positive_phrases
                .iter()
                .chain(&config.generic_negative_phrases)
                .collect(),
            "generic phrase",
        )?;
        let complaint_keywords = build(config.complaint_keywords.iter().collect(), "complaint")?;

        Ok(Self {
            config,
            placeholders,
            generic_phrases,
            complaint_keywords,
        })
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Compute the surface features of a review
    pub fn features(&self, raw: &str, normalized: &str) -> RuleFeatures {
        let mut letters = 0usize;
        let mut uppercase = 0usize;
        let mut exclamation_count = 0usize;
        let mut emoji_count = 0usize;
        let mut raw_length = 0usize;

        for c in raw.chars() {
            raw_length += 1;
            if c == '!' {
                exclamation_count += 1;
            }
            if self.is_emoji(c) {
                emoji_count += 1;
            }
            if c.is_alphabetic() {
                letters += 1;
                if c.is_uppercase() {
                    uppercase += 1;
                }
            }
        }

        let uppercase_ratio = if letters == 0 {
            0.0
        } else {
            uppercase as f64 / letters as f64
        };

        RuleFeatures {
            has_placeholder: self.placeholders.is_match(normalized),
            exclamation_count,
            emoji_count,
            uppercase_ratio,
            raw_length,
            normalized_length: normalized.chars().count(),
            token_count: normalized.split_whitespace().count(),
            has_generic_phrase: self.generic_phrases.is_match(normalized),
            has_complaint_keyword: self.complaint_keywords.is_match(normalized),
        }
    }

    /// Rule verdict for a review
    pub fn score(&self, raw: &str, normalized: &str) -> RuleVerdict {
        self.verdict(&self.features(raw, normalized))
    }

    /// Verdict from precomputed features. The complaint override is checked
    /// before any points are counted.
    pub fn verdict(&self, features: &RuleFeatures) -> RuleVerdict {
        if self.is_genuine_complaint(features) {
            return RuleVerdict::Real;
        }

        match self.points(features) {
            p if p >= self.config.spam_threshold => RuleVerdict::Spam,
            0 => RuleVerdict::Real,
            _ => RuleVerdict::Uncertain,
        }
    }

    /// Additive spam score
    pub fn points(&self, f: &RuleFeatures) -> i32 {
        let c = &self.config;
        let mut points = 0;

        if f.has_placeholder {
            points += c.placeholder_weight;
        }
        if f.exclamation_count >= c.exclamation_threshold {
            points += c.exclamation_weight;
        }
        if f.emoji_count >= c.emoji_threshold {
            points += c.emoji_weight;
        }
        if self.is_shouting(f) {
            points += c.uppercase_weight;
        }
        if f.token_count <= c.short_generic_tokens && f.has_generic_phrase {
            points += c.short_generic_weight;
        }
        if f.normalized_length <= c.compact_generic_length && f.has_generic_phrase {
            points += c.compact_generic_weight;
        }

        points
    }

    /// Long complaint without links or contacts
    pub fn is_genuine_complaint(&self, f: &RuleFeatures) -> bool {
        !f.has_placeholder
            && f.token_count >= self.config.complaint_min_tokens
            && f.has_complaint_keyword
    }

    /// Indicators triggered by a review
    pub fn indicators(&self, f: &RuleFeatures) -> Vec<Indicator> {
        let mut indicators = Vec::new();

        if f.has_placeholder {
            indicators.push(Indicator::Placeholder);
        }
        if f.exclamation_count >= self.config.exclamation_threshold {
            indicators.push(Indicator::ExcessiveExclamation);
        }
        if f.emoji_count >= self.config.emoji_threshold {
            indicators.push(Indicator::ExcessiveEmoji);
        }
        if self.is_shouting(f) {
            indicators.push(Indicator::MajorityUppercase);
        }

        indicators
    }

    /// Explanation strings; a single [`NORMAL_INDICATOR`] when nothing fired
    pub fn explain(&self, features: &RuleFeatures) -> Vec<String> {
        let indicators = self.indicators(features);
        if indicators.is_empty() {
            return vec![NORMAL_INDICATOR.to_string()];
        }
        indicators.iter().map(|i| i.to_string()).collect()
    }

    fn is_shouting(&self, f: &RuleFeatures) -> bool {
        f.uppercase_ratio > self.config.uppercase_ratio
            && f.raw_length > self.config.uppercase_min_length
    }

    fn is_emoji(&self, c: char) -> bool {
        let code = c as u32;
        self.config
            .emoji_ranges
            .iter()
            .any(|&(start, end)| (start..=end).contains(&code))
    }
}

impl Default for RuleSpamScorer {
    fn default() -> Self {
        Self::new(RuleConfig::default()).expect("Failed to create rule scorer")
    }
}

impl fmt::Debug for RuleSpamScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSpamScorer")
            .field("config", &self.config)
            .finish()
    }
}
