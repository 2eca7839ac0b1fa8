//! Whole-document analysis endpoint

use axum::{
  extract::{Extension, State},
  http::StatusCode,
  response::Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::analysis::csv::read_document;
use crate::server::handlers::{api_error, ApiError};
use crate::server::middleware::RequestContext;
use crate::server::types::AnalyzeCsvResponse;
use crate::server::AppState;

/// POST /api/analyze-csv - Analyze every product in a raw CSV body
pub async fn analyze_csv(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  body: String,
) -> Result<Json<AnalyzeCsvResponse>, ApiError> {
  let rows = read_document(&body).map_err(|e| {
    warn!(request_id = %context.request_id, error = %e, "rejected CSV document");
    api_error(StatusCode::BAD_REQUEST, e.to_string())
  })?;

  debug!(request_id = %context.request_id, rows = rows.len(), "analyzing CSV document");
  let results = state.pipeline.run(rows).await;

  Ok(Json(AnalyzeCsvResponse { results }))
}
