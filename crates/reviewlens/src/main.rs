use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use reviewlens::analysis::{GeminiClient, Pipeline};
use reviewlens::cli::{commands, OutputFormat};
use reviewlens::config::{load_dotenv, ModelArgs};

#[derive(Parser)]
#[command(name = "reviewlens")]
#[command(
  about = "Reviewlens - Product Review Analysis\n\
           Per-product feature and sentiment summaries from review CSV exports"
)]
#[command(version)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Analyze every product in a review CSV file
  Analyze {
    /// CSV file with a review_text column and a product_id or product_title column
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    #[command(flatten)]
    model: ModelArgs,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let dotenv = load_dotenv();
  let cli = Cli::parse();

  // Logs go to stderr so JSON output on stdout stays clean
  let filter = if cli.verbose {
    EnvFilter::new("reviewlens=debug,warn")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reviewlens=warn,error"))
  };
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();

  if let Err(e) = dotenv {
    warn!(error = %e, "ignoring unreadable .env file");
  }

  match cli.command {
    Command::Analyze { file, format, model } => {
      let model_config = model.model_config();
      if !model_config.has_credential() {
        warn!("GEMINI_API_KEY is not set; every product will use heuristic analysis");
      }

      let client = GeminiClient::new(model_config)?;
      let pipeline = Pipeline::from_generator(Arc::new(client), &model.pipeline_config());

      commands::analyze_file(&pipeline, &file, format)
        .await
        .with_context(|| format!("Failed to analyze {}", file.display()))?;
    }
  }

  Ok(())
}
