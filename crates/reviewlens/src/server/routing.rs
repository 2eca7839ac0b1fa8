//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};
use std::sync::Arc;

use crate::server::handlers::{analyze, batch, status};
use crate::server::middleware::request_context_middleware;
use crate::server::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    // Analysis endpoints; any other method gets a JSON 405
    .route(
      "/api/analyze-reviews",
      post(analyze::analyze_reviews).fallback(analyze::method_not_allowed),
    )
    .route("/api/analyze-csv", post(batch::analyze_csv).fallback(analyze::method_not_allowed))
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(state)
}
