//! Per-request context for the REST API
//!
//! Every request gets a `RequestContext` in its extensions. Start and
//! completion are logged with the request id so handler logs can be
//! correlated.

use axum::{
  extract::Request,
  http::{Method, Uri},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RequestContext {
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
  /// User agent header, if it was valid text
  pub user_agent: Option<String>,
}

impl RequestContext {
  pub fn from_request(request: &Request) -> Self {
    let user_agent = request
      .headers()
      .get("user-agent")
      .and_then(|value| value.to_str().ok())
      .map(str::to_string);

    Self {
      request_id: Uuid::new_v4(),
      method: request.method().clone(),
      uri: request.uri().clone(),
      user_agent,
    }
  }

  pub fn log_request_start(&self) {
    info!(
      request_id = %self.request_id,
      method = %self.method,
      path = self.uri.path(),
      user_agent = self.user_agent.as_deref().unwrap_or("none"),
      "request started"
    );
  }

  pub fn log_request_complete(&self, status: u16, duration_ms: f64) {
    info!(
      request_id = %self.request_id,
      method = %self.method,
      path = self.uri.path(),
      status,
      duration_ms,
      "request completed"
    );
  }
}

/// Middleware to inject RequestContext into all requests
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
  let context = RequestContext::from_request(&request);

  let start_time = Instant::now();
  context.log_request_start();

  request.extensions_mut().insert(context.clone());
  let response = next.run(request).await;

  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  context.log_request_complete(response.status().as_u16(), duration_ms);

  response
}
