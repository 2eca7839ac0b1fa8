//! Single-product analysis endpoint

use axum::{
  extract::{rejection::JsonRejection, Extension, Json, State},
  http::StatusCode,
  response::Json as ResponseJson,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::analysis::normalizer::parse_analysis_object;
use crate::analysis::RowRecord;
use crate::server::handlers::{api_error, ApiError};
use crate::server::middleware::RequestContext;
use crate::server::types::{AnalyzeReviewsRequest, AnalyzeReviewsResponse};
use crate::server::AppState;

const MISSING_INPUT: &str = "Missing productName or reviews array";

/// Any method other than POST on an analysis route
pub async fn method_not_allowed() -> ApiError {
  api_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed. Use POST.")
}

/// POST /api/analyze-reviews - Ask the model about one product's reviews.
///
/// Returns the model's JSON object as-is. There is no heuristic fallback on
/// this route: upstream and parse failures are reported as 500s.
pub async fn analyze_reviews(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<AnalyzeReviewsRequest>, JsonRejection>,
) -> Result<ResponseJson<AnalyzeReviewsResponse>, ApiError> {
  let request = match payload {
    Ok(Json(request)) => request,
    Err(rejection) => {
      debug!(request_id = %context.request_id, error = %rejection, "rejected request body");
      return Err(api_error(StatusCode::BAD_REQUEST, MISSING_INPUT));
    }
  };

  let (product_name, reviews) = validate(request)?;
  debug!(
    request_id = %context.request_id,
    product = %product_name,
    reviews = reviews.len(),
    "analyzing reviews"
  );

  let raw = match state.pipeline.requester().request_analysis(&product_name, &reviews).await {
    Ok(raw) => raw,
    Err(e) => {
      warn!(
        request_id = %context.request_id,
        product = %product_name,
        error = %e,
        "model request failed"
      );
      return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate analysis"));
    }
  };

  match parse_analysis_object(&raw) {
    Ok(analysis) => Ok(ResponseJson(AnalyzeReviewsResponse { analysis })),
    Err(e) => {
      warn!(
        request_id = %context.request_id,
        product = %product_name,
        error = %e,
        "model reply rejected"
      );
      Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Invalid JSON from model"))
    }
  }
}

/// Non-blank product name plus a reviews array; array items that are not
/// objects become empty rows
fn validate(request: AnalyzeReviewsRequest) -> Result<(String, Vec<RowRecord>), ApiError> {
  let product_name = match request.product_name {
    Some(Value::String(name)) if !name.trim().is_empty() => name,
    _ => return Err(api_error(StatusCode::BAD_REQUEST, MISSING_INPUT)),
  };

  let reviews = match request.reviews {
    Some(Value::Array(items)) => items
      .into_iter()
      .map(|item| serde_json::from_value::<RowRecord>(item).unwrap_or_default())
      .collect(),
    _ => return Err(api_error(StatusCode::BAD_REQUEST, MISSING_INPUT)),
  };

  Ok((product_name, reviews))
}
