//! Status and version endpoint handlers

use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::server::types::{StatusResponse, VersionResponse};
use crate::server::AppState;

/// GET /status - Health check endpoint
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
  Json(StatusResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    model: state.model.clone(),
    started_at: state.started_at,
  })
}

/// GET /version - Returns current API version
pub async fn version() -> Json<VersionResponse> {
  Json(VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() })
}
