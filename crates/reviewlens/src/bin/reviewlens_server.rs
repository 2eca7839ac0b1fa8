//! Reviewlens REST Server
//!
//! HTTP API over the review analysis pipeline: single-product model analysis
//! and whole-CSV batch analysis with heuristic fallback.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use reviewlens::analysis::{GeminiClient, Pipeline};
use reviewlens::config::{load_dotenv, ModelArgs};
use reviewlens::server::{startup::start_server, AppState};

#[derive(Parser)]
#[command(name = "reviewlens_server")]
#[command(about = "Reviewlens REST API Server")]
#[command(version)]
struct Args {
  /// Server bind address
  #[arg(long, env = "REVIEWLENS_BIND", default_value = "127.0.0.1:3001")]
  bind: SocketAddr,

  /// Only allow this origin for cross-origin requests (any origin if unset)
  #[arg(long, env = "REVIEWLENS_CORS_ORIGIN")]
  cors_origin: Option<String>,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,

  #[command(flatten)]
  model: ModelArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
  let dotenv = load_dotenv();
  let args = Args::parse();

  let filter = if args.verbose {
    EnvFilter::new("reviewlens=debug,tower_http=debug,info")
  } else {
    EnvFilter::new("reviewlens=info,warn")
  };
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  match dotenv {
    Ok(Some(path)) => info!(path = %path.display(), "loaded environment file"),
    Ok(None) => {}
    Err(e) => warn!(error = %e, "ignoring unreadable .env file"),
  }

  info!(version = env!("CARGO_PKG_VERSION"), bind = %args.bind, "starting Reviewlens REST Server");

  let model_config = args.model.model_config();
  if !model_config.has_credential() {
    warn!("GEMINI_API_KEY is not set; model requests will fail and batches will use heuristics");
  }

  let model = model_config.endpoint.to_string();
  let client = GeminiClient::new(model_config)?;
  let pipeline = Pipeline::from_generator(Arc::new(client), &args.model.pipeline_config());
  let state = Arc::new(AppState::new(pipeline, model));

  start_server(args.bind, state, args.cors_origin.as_deref()).await
}
