//! Deterministic text normalization
//!
//! Canonicalizes raw review text into a stable token form:
//! Unicode composition, case folding, placeholder substitution for URLs,
//! e-mail addresses and phone numbers, repetition collapse, whitespace
//! cleanup and optional stemming. Placeholders are opaque atoms and are
//! never handed to the stemmer.

use crate::Result;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Placeholder substituted for URL-like substrings
pub const URL_PLACEHOLDER: &str = "<url>";
/// Placeholder substituted for e-mail addresses
pub const EMAIL_PLACEHOLDER: &str = "<email>";
/// Placeholder substituted for phone numbers
pub const PHONE_PLACEHOLDER: &str = "<phone>";

/// All placeholder atoms
pub const PLACEHOLDERS: [&str; 3] = [URL_PLACEHOLDER, EMAIL_PLACEHOLDER, PHONE_PLACEHOLDER];

/// Upper bound on substitute-and-collapse passes. Every pass that changes
/// the text removes a match or shortens it, so real input settles in two or
/// three.
const MAX_PASSES: usize = 16;

/// Whether a token is a placeholder atom (`<...>`)
pub fn is_placeholder(token: &str) -> bool {
    token.len() > 1 && token.starts_with('<') && token.ends_with('>')
}

/// Languages available for morphological stemming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemmerLanguage {
    Turkish,
    English,
}

impl StemmerLanguage {
    fn algorithm(self) -> Algorithm {
        match self {
            Self::Turkish => Algorithm::Turkish,
            Self::English => Algorithm::English,
        }
    }
}

/// Normalizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Stemmer applied to non-placeholder tokens; `None` disables stemming
    #[serde(default = "default_stemmer")]
    pub stemmer: Option<StemmerLanguage>,
}

impl NormalizerConfig {
    /// Configuration with stemming disabled
    pub fn without_stemming() -> Self {
        Self { stemmer: None }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            stemmer: default_stemmer(),
        }
    }
}

fn default_stemmer() -> Option<StemmerLanguage> {
    Some(StemmerLanguage::Turkish)
}

/// Text normalizer. Construction compiles the substitution patterns once;
/// `normalize` itself is total and never fails.
pub struct TextNormalizer {
    config: NormalizerConfig,
    url_regex: Regex,
    email_regex: Regex,
    phone_regex: Regex,
    whitespace_regex: Regex,
    stemmer: Option<Stemmer>,
}

impl TextNormalizer {
    /// Create a normalizer
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        let compile = |pattern: &str, what: &str| {
            Regex::new(pattern).map_err(|e| {
                crate::Error::config(format!("Failed to compile {what} regex: {e}"))
            })
        };

        debug!(stemmer = ?config.stemmer, "Building text normalizer");

        Ok(Self {
            url_regex: compile(r"https?://\S+|www\.\S+", "url")?,
            email_regex: compile(r"\b[\w.-]+@[\w.-]+\.\w+\b", "email")?,
            phone_regex: compile(
                r"(?:\+90|\b90|\b)\s?(\(?\d{3}\)?)\s?\d{3}\s?\d{2}\s?\d{2}\b",
                "phone",
            )?,
            whitespace_regex: compile(r"\s+", "whitespace")?,
            stemmer: config.stemmer.map(|lang| Stemmer::create(lang.algorithm())),
            config,
        })
    }

    /// Normalizer with stemming disabled
    pub fn without_stemming() -> Result<Self> {
        Self::new(NormalizerConfig::without_stemming())
    }

    /// Active configuration
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize a possibly-missing cell; missing input normalizes to `""`
    pub fn normalize_cell(&self, raw: Option<&str>) -> String {
        raw.map(|text| self.normalize(text)).unwrap_or_default()
    }

    /// Normalize raw text
    pub fn normalize(&self, raw: &str) -> String {
        let composed: String = raw.nfc().collect();
        // Lowercasing can expose composable pairs (J + caron -> ǰ).
        let text: String = composed.to_lowercase().nfc().collect();
        // Collapsing repeats and whitespace can complete a pattern
        // ("htttp://", "532  123 45 67"), so run to a fixed point.
        let mut text = text.trim().to_string();
        for _ in 0..MAX_PASSES {
            let next = self.substitute_and_collapse(&text);
            if next == text {
                break;
            }
            text = next;
        }

        match &self.stemmer {
            Some(stemmer) if !text.is_empty() => stem_tokens(stemmer, &text),
            _ => text,
        }
    }

    /// Placeholder substitution, repeat collapse and whitespace cleanup
    fn substitute_and_collapse(&self, text: &str) -> String {
        let text = self.url_regex.replace_all(text, " <url> ");
        let text = self.email_regex.replace_all(&text, " <email> ");
        let text = self.phone_regex.replace_all(&text, " <phone> ");

        let text = collapse_repeats(&text);
        self.whitespace_regex.replace_all(&text, " ").trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default()).expect("Failed to create text normalizer")
    }
}

impl fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("config", &self.config)
            .finish()
    }
}

/// Collapse every run of 3+ identical characters down to exactly 2.
fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    let mut run = 0usize;

    for c in text.chars() {
        if Some(c) == previous {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if run <= 2 {
            out.push(c);
        }
    }

    out
}

fn stem_tokens(stemmer: &Stemmer, text: &str) -> String {
    text.split_whitespace()
        .map(|token| {
            if is_placeholder(token) {
                return token.to_string();
            }
            let root = stemmer.stem(token);
            if root.is_empty() {
                token.to_string()
            } else {
                root.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plain() -> TextNormalizer {
        TextNormalizer::without_stemming().unwrap()
    }

    #[test]
    fn test_url_placeholder() {
        let out = plain().normalize("check http://foo.bar now");
        assert_eq!(out, "check <url> now");

        let out = plain().normalize("bakın www.site.com'dan aldım");
        assert!(out.contains("<url>"));
    }

    #[test]
    fn test_email_and_phone_placeholders() {
        let n = plain();
        assert_eq!(n.normalize("yaz bana ali.veli@ornek.com lütfen"), "yaz bana <email> lütfen");
        assert_eq!(n.normalize("ara 532 123 45 67 hemen"), "ara <phone> hemen");
        assert_eq!(n.normalize("no: 5321234567"), "no: <phone>");
        assert_eq!(n.normalize("+90 532 123 45 67"), "<phone>");
        assert_eq!(n.normalize("tel +90 5321234567."), "tel <phone> .");
        assert_eq!(n.normalize("905321234567"), "<phone>");
    }

    #[test]
    fn test_repetition_collapse() {
        assert_eq!(plain().normalize("çooook"), "çook");
        assert_eq!(plain().normalize("süüüüper!!!!!"), "süüper!!");
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(plain().normalize("  HARIKA   Bir\tÜrün \n"), "harika bir ürün");
    }

    #[test]
    fn test_unicode_composition() {
        // "u" + combining diaeresis composes to "ü"
        assert_eq!(plain().normalize("u\u{0308}rün"), "ürün");
    }

    #[test]
    fn test_missing_input_is_empty() {
        assert_eq!(plain().normalize_cell(None), "");
        assert_eq!(plain().normalize(""), "");
        assert_eq!(TextNormalizer::default().normalize("   "), "");
    }

    #[test]
    fn test_stemming_keeps_placeholders() {
        let normalizer = TextNormalizer::default();
        let out = normalizer.normalize("kitapları www.site.com adresinden aldım");

        let tokens: Vec<_> = out.split(' ').collect();
        assert!(tokens.contains(&"<url>"));
        assert_eq!(tokens.len(), 4);
        assert!(!tokens[0].is_empty());
    }

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder("<url>"));
        assert!(is_placeholder("<phone>"));
        assert!(!is_placeholder("<"));
        assert!(!is_placeholder("url"));
    }

    #[test]
    fn test_collapse_that_completes_a_pattern_is_idempotent() {
        let n = plain();
        let cases = [
            ("ara 532  123 45 67", "ara <phone>"),
            ("bak htttp://x.co", "bak <url>"),
            ("no 532111123456", "no <phone>"),
        ];

        for (raw, expected) in cases {
            let once = n.normalize(raw);
            assert_eq!(once, expected, "input {raw:?}");
            assert_eq!(n.normalize(&once), once, "input {raw:?}");
        }
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(input in "\\PC{0,60}") {
            let n = plain();
            let once = n.normalize(&input);
            prop_assert_eq!(n.normalize(&once), once);
        }

        #[test]
        fn prop_review_like_text_is_idempotent(
            words in proptest::collection::vec("[a-zA-ZçğıöşüÇĞİÖŞÜ!?.]{1,8}", 0..12)
        ) {
            let n = plain();
            let once = n.normalize(&words.join(" "));
            prop_assert_eq!(n.normalize(&once), once);
        }
    }
}
