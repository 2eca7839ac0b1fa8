//! Request and response bodies for the REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::AnalysisRecord;

// Error Bodies
// ============

/// Body of every non-2xx response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
  pub error: String,
}

impl ErrorResponse {
  pub fn new(message: impl Into<String>) -> Self {
    Self { error: message.into() }
  }
}

// Analysis Endpoints
// ==================

/// Request for /api/analyze-reviews.
///
/// Both fields are validated by the handler rather than by serde so that a
/// missing name and a non-array `reviews` produce the same error body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReviewsRequest {
  #[serde(default)]
  pub product_name: Option<Value>,

  #[serde(default)]
  pub reviews: Option<Value>,
}

/// Response for /api/analyze-reviews: the model's JSON object as parsed
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeReviewsResponse {
  pub analysis: Map<String, Value>,
}

/// Response for /api/analyze-csv
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeCsvResponse {
  pub results: Vec<AnalysisRecord>,
}

// Status/Version Endpoints
// ========================

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  /// Text-generation endpoint in use, without credentials
  pub model: String,
  pub started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
  pub version: String,
}
