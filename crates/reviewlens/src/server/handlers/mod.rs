//! Endpoint handlers

pub mod analyze;
pub mod batch;
pub mod status;

use axum::{http::StatusCode, response::Json};

use crate::server::types::ErrorResponse;

/// Error half of every fallible handler
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
  (status, Json(ErrorResponse::new(message)))
}
