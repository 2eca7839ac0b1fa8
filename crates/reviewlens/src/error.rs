//! Error types for the analysis pipeline

use std::time::Duration;
use thiserror::Error;

/// A mandatory CSV column is missing from the header line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MissingColumnError {
  #[error("CSV must contain 'review_text' column.")]
  ReviewText,

  #[error("CSV must contain either 'product_id' or 'product_title' column.")]
  ProductColumn,
}

/// Whole-document failures raised before any grouping happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
  #[error("CSV file must contain headers and at least one row of data.")]
  TooShort,

  #[error(transparent)]
  MissingColumn(#[from] MissingColumnError),
}

/// Per-product failures on the model-backed path.
///
/// None of these abort a batch: the pipeline logs them and substitutes the
/// heuristic analysis for the affected product.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
  #[error("Upstream request failed: {message}")]
  UpstreamRequest { message: String },

  #[error("Upstream request timed out after {seconds}s")]
  Timeout { seconds: u64 },

  #[error("Malformed model response: {message}")]
  MalformedResponse { message: String },
}

impl AnalysisError {
  pub fn upstream(message: impl Into<String>) -> Self {
    Self::UpstreamRequest { message: message.into() }
  }

  pub fn timeout(deadline: Duration) -> Self {
    Self::Timeout { seconds: deadline.as_secs() }
  }

  pub fn malformed(message: impl Into<String>) -> Self {
    Self::MalformedResponse { message: message.into() }
  }

  /// Transport-side failure (including deadline expiry) as opposed to a bad reply
  pub fn is_upstream(&self) -> bool {
    matches!(self, Self::UpstreamRequest { .. } | Self::Timeout { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_column_messages() {
    assert_eq!(
      MissingColumnError::ReviewText.to_string(),
      "CSV must contain 'review_text' column."
    );
    assert!(MissingColumnError::ProductColumn.to_string().contains("product_title"));
  }

  #[test]
  fn test_document_error_wraps_missing_column() {
    let error: DocumentError = MissingColumnError::ReviewText.into();
    assert_eq!(error, DocumentError::MissingColumn(MissingColumnError::ReviewText));
    assert_eq!(error.to_string(), MissingColumnError::ReviewText.to_string());
  }

  #[test]
  fn test_timeout_counts_as_upstream() {
    assert!(AnalysisError::timeout(Duration::from_secs(30)).is_upstream());
    assert!(AnalysisError::upstream("502").is_upstream());
    assert!(!AnalysisError::malformed("not json").is_upstream());
    assert_eq!(
      AnalysisError::timeout(Duration::from_secs(30)).to_string(),
      "Upstream request timed out after 30s"
    );
  }
}
