//! Mapping of heterogeneous label encodings onto the canonical sentiment scale

use crate::config::LabelConfig;
use crate::reader::parse_number;
use reviewguard_core::CanonicalSentiment;

/// Resolves raw label values to [`CanonicalSentiment`].
///
/// Numeric values are tried first: integral values in {0,1,2} are used as-is
/// and -1 shifts to 0 (the {-1,0,1} encoding). Everything else goes through
/// the lower-cased synonym table. Values resolved by neither are `None`.
#[derive(Debug, Clone, Default)]
pub struct LabelReconciler {
    config: LabelConfig,
}

impl LabelReconciler {
    pub fn new(config: LabelConfig) -> Self {
        Self { config }
    }

    /// Resolve one raw value
    pub fn resolve(&self, raw: Option<&str>) -> Option<CanonicalSentiment> {
        let raw = raw?;

        if let Some(sentiment) = parse_number(raw).and_then(numeric_sentiment) {
            return Some(sentiment);
        }

        self.config
            .mapping
            .get(raw.trim().to_lowercase().as_str())
            .copied()
    }

    /// Resolve a whole column, preserving row order
    pub fn reconcile<'a>(
        &self,
        column: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Vec<Option<CanonicalSentiment>> {
        column.into_iter().map(|raw| self.resolve(raw)).collect()
    }
}

fn numeric_sentiment(value: f64) -> Option<CanonicalSentiment> {
    if value.fract() != 0.0 {
        return None;
    }
    match value as i64 {
        -1 => Some(CanonicalSentiment::Negative),
        index => CanonicalSentiment::from_index(index),
    }
}
