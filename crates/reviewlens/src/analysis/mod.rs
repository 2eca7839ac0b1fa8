//! Review-to-analysis pipeline
//!
//! Leaves first: `csv` and `headers` turn a document into row records,
//! `grouping` partitions them per product, `heuristics` derives a complete
//! analysis without any external dependency, `prompt` and `requester` talk to
//! the text-generation model, `normalizer` validates and repairs its reply, and
//! `pipeline` sequences all of it with a per-product fallback.

pub mod csv;
pub mod grouping;
pub mod headers;
pub mod heuristics;
pub mod normalizer;
pub mod pipeline;
pub mod prompt;
pub mod requester;
pub mod types;

pub use grouping::{group_by_product, ProductGroup};
pub use pipeline::Pipeline;
pub use requester::{AnalysisRequester, GeminiClient, TextGenerator};
pub use types::{
  AnalysisRecord, AnalysisSource, FeatureEntry, FeatureTable, RowRecord, Sentiment, Summary,
};
