//! Runtime configuration
//!
//! Everything the model-backed path needs is carried in explicit structs that
//! are handed to constructors; nothing in the library reads the environment
//! on its own. The binaries build these structs from command-line arguments,
//! which clap falls back to environment variables (and a `.env` file) for.

use clap::Args;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MODEL_URL: &str =
  "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent";
pub const DEFAULT_MAX_REVIEWS: usize = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Connection details for the text-generation endpoint
#[derive(Clone)]
pub struct ModelConfig {
  /// Credential appended to every request; `None` makes each call fail fast
  pub api_key: Option<String>,
  pub endpoint: Url,
}

impl ModelConfig {
  pub fn new(api_key: Option<String>, endpoint: Url) -> Self {
    let api_key = api_key.filter(|key| !key.trim().is_empty());
    Self { api_key, endpoint }
  }

  pub fn has_credential(&self) -> bool {
    self.api_key.is_some()
  }
}

impl fmt::Debug for ModelConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ModelConfig")
      .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
      .field("endpoint", &self.endpoint.as_str())
      .finish()
  }
}

/// Batch behavior of the analysis pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
  /// Reviews beyond this count are left out of the prompt
  pub max_reviews: usize,
  /// Deadline for a single model request
  pub request_timeout: Duration,
  /// Model requests allowed in flight at once
  pub concurrency: usize,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      max_reviews: DEFAULT_MAX_REVIEWS,
      request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
      concurrency: DEFAULT_CONCURRENCY,
    }
  }
}

/// Model and pipeline options shared by every binary
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
  /// Credential for the text-generation endpoint
  #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
  pub api_key: Option<String>,

  /// Text-generation endpoint URL
  #[arg(long, env = "REVIEWLENS_MODEL_URL", default_value = DEFAULT_MODEL_URL)]
  pub endpoint: Url,

  /// Seconds to wait for a single model response before falling back
  #[arg(long, env = "REVIEWLENS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
  pub timeout_secs: u64,

  /// Maximum number of reviews sent to the model per product
  #[arg(long, default_value_t = DEFAULT_MAX_REVIEWS)]
  pub max_reviews: usize,

  /// Number of products analyzed concurrently
  #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
  pub concurrency: usize,
}

impl ModelArgs {
  pub fn model_config(&self) -> ModelConfig {
    ModelConfig::new(self.api_key.clone(), self.endpoint.clone())
  }

  pub fn pipeline_config(&self) -> PipelineConfig {
    PipelineConfig {
      max_reviews: self.max_reviews,
      request_timeout: Duration::from_secs(self.timeout_secs),
      concurrency: self.concurrency.max(1),
    }
  }
}

/// Load `.env` from the working directory, if there is one.
///
/// Must run before argument parsing so clap sees the variables. A missing
/// file is not an error.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
  match dotenvy::dotenv() {
    Ok(path) => Ok(Some(path)),
    Err(error) if error.not_found() => Ok(None),
    Err(error) => Err(error),
  }
}
