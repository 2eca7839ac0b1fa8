//! REST API for the review analysis pipeline
//!
//! Built on axum: `routing` wires the endpoints, `handlers` holds one module
//! per endpoint family, `middleware` tags each request with an id for the
//! logs, and `startup` binds the listener with tracing and CORS layers.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod types;

use chrono::{DateTime, Utc};

use crate::analysis::Pipeline;

/// State shared by every handler
pub struct AppState {
  pub pipeline: Pipeline,
  /// Model endpoint reported by /status
  pub model: String,
  pub started_at: DateTime<Utc>,
}

impl AppState {
  pub fn new(pipeline: Pipeline, model: impl Into<String>) -> Self {
    Self { pipeline, model: model.into(), started_at: Utc::now() }
  }
}
