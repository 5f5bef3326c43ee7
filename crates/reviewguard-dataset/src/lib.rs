//! Reviewguard Dataset
//!
//! Ingestion of review datasets whose column names and label encodings are
//! not known in advance.
//!
//! The flow is:
//! - [`reader`] decodes a CSV source, detecting encoding and delimiter
//! - [`schema`] identifies the text, label and rating columns
//! - [`labels`] maps raw labels onto the canonical 3-class sentiment scale
//! - [`corpus`] normalizes the text column into training records

pub mod config;
pub mod corpus;
pub mod labels;
pub mod provider;
pub mod reader;
pub mod schema;

pub use config::{DatasetConfig, LabelConfig, SchemaConfig};
pub use corpus::{Corpus, CorpusBuilder, CorpusRecord, CorpusStats};
pub use labels::LabelReconciler;
pub use provider::{DatasetProvider, FallbackProvider, LocalFileProvider};
pub use reader::{read_dataset, read_dataset_bytes, TextEncoding};
pub use schema::{LabelMethod, SchemaInference, SchemaInferrer};

use reviewguard_core::{Dataset, Result, TextNormalizer};

/// Infer the schema of a dataset and build its corpus in one step
pub fn prepare_corpus(dataset: &Dataset, config: &DatasetConfig) -> Result<(SchemaInference, Corpus)> {
    let schema = SchemaInferrer::new(config.schema.clone()).infer(dataset);
    let builder = CorpusBuilder::new(
        TextNormalizer::new(config.normalizer.clone())?,
        LabelReconciler::new(config.labels.clone()),
    );
    let corpus = builder.build(dataset, &schema)?;
    Ok((schema, corpus))
}
