//! REST server startup and configuration

use anyhow::{Context, Result};
use axum::{http::HeaderValue, serve};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use tracing::info;

use crate::server::routing::create_router;
use crate::server::AppState;

/// CORS policy: any origin, or exactly one when configured
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
  match origin {
    None => Ok(CorsLayer::permissive()),
    Some(origin) => {
      let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid CORS origin: {origin}"))?;
      Ok(CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any))
    }
  }
}

/// Start the REST server and run until ctrl-c
pub async fn start_server(
  addr: SocketAddr,
  state: Arc<AppState>,
  cors_origin: Option<&str>,
) -> Result<()> {
  info!(%addr, model = %state.model, "starting reviewlens REST server");

  let app = create_router(state).layer(
    ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors_layer(cors_origin)?),
  );

  let listener =
    TcpListener::bind(addr).await.with_context(|| format!("Failed to bind to {addr}"))?;
  info!(%addr, "server listening");

  serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

  info!("server shut down gracefully");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cors_layer_accepts_origin() {
    assert!(cors_layer(None).is_ok());
    assert!(cors_layer(Some("http://localhost:8080")).is_ok());
  }

  #[test]
  fn test_cors_layer_rejects_invalid_origin() {
    assert!(cors_layer(Some("bad\norigin")).is_err());
  }
}
