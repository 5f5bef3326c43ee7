//! Reviewguard Core
//!
//! Core types, text normalization, and utilities shared across reviewguard components.
//!
//! This crate provides:
//! - Dataset, sentiment and spam-label types
//! - Error types and result handling
//! - The deterministic text normalizer used by both training and inference

pub mod error;
pub mod normalize;
pub mod types;

pub use error::{Error, Result};
pub use normalize::{
    is_placeholder, NormalizerConfig, StemmerLanguage, TextNormalizer, EMAIL_PLACEHOLDER,
    PHONE_PLACEHOLDER, PLACEHOLDERS, URL_PLACEHOLDER,
};
pub use types::{
    CanonicalSentiment, ColumnRole, Dataset, HybridLabel, RawRecord, RuleVerdict, SpamLabel,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::normalize::{NormalizerConfig, TextNormalizer};
    pub use crate::types::{CanonicalSentiment, Dataset, RawRecord, SpamLabel};
}
