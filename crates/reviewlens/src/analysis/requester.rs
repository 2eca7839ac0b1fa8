//! Model requests
//!
//! `TextGenerator` is the seam to the external model: production code uses
//! `GeminiClient`, tests inject their own implementations. `AnalysisRequester`
//! wraps a generator with prompt construction, review truncation and a
//! per-request deadline.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::analysis::prompt::build_prompt;
use crate::analysis::types::RowRecord;
use crate::config::{ModelConfig, PipelineConfig};
use crate::error::AnalysisError;

const CONNECT_TIMEOUT_SECS: u64 = 15;
const ERROR_BODY_PREVIEW: usize = 200;

/// Black-box text completion
#[async_trait]
pub trait TextGenerator: Send + Sync {
  /// Return the model's raw text output for `prompt`
  async fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}

// Gemini wire format
// ==================

#[derive(Serialize)]
struct GenerateRequest<'a> {
  contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
  parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
  text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
  #[serde(default)]
  text: Option<String>,
}

impl GenerateResponse {
  /// First candidate's first text part
  fn into_text(self) -> Option<String> {
    self.candidates.into_iter().next()?.content?.parts.into_iter().next()?.text
  }
}

/// Client for a Gemini-style `generateContent` endpoint
pub struct GeminiClient {
  client: Client,
  config: ModelConfig,
}

impl GeminiClient {
  pub fn new(config: ModelConfig) -> Result<Self> {
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
      .build()
      .context("Failed to create HTTP client")?;

    Ok(Self { client, config })
  }
}

#[async_trait]
impl TextGenerator for GeminiClient {
  async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
    let api_key = self
      .config
      .api_key
      .as_deref()
      .ok_or_else(|| AnalysisError::upstream("no API credential configured"))?;

    let body = GenerateRequest {
      contents: vec![RequestContent { parts: vec![RequestPart { text: prompt }] }],
    };

    let response = self
      .client
      .post(self.config.endpoint.clone())
      .query(&[("key", api_key)])
      .json(&body)
      .send()
      .await
      .map_err(|e| AnalysisError::upstream(format!("request to model endpoint failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      let detail: String = detail.chars().take(ERROR_BODY_PREVIEW).collect();
      return Err(AnalysisError::upstream(format!("model endpoint returned {status}: {detail}")));
    }

    let reply: GenerateResponse = response
      .json()
      .await
      .map_err(|e| AnalysisError::upstream(format!("undecodable model endpoint reply: {e}")))?;

    let text = reply.into_text().unwrap_or_default();
    debug!(chars = text.len(), "received model reply");
    Ok(text)
  }
}

/// Prompt-building wrapper around a generator
#[derive(Clone)]
pub struct AnalysisRequester {
  generator: Arc<dyn TextGenerator>,
  max_reviews: usize,
  deadline: Duration,
}

impl AnalysisRequester {
  pub fn new(generator: Arc<dyn TextGenerator>, config: &PipelineConfig) -> Self {
    Self { generator, max_reviews: config.max_reviews, deadline: config.request_timeout }
  }

  /// The reviews that will actually be sent
  pub fn limit_reviews<'a>(&self, reviews: &'a [RowRecord]) -> &'a [RowRecord] {
    &reviews[..reviews.len().min(self.max_reviews)]
  }

  /// Ask the model to analyze one product and return its raw reply.
  ///
  /// Does not retry. Deadline expiry yields `AnalysisError::Timeout`.
  pub async fn request_analysis(
    &self,
    product_name: &str,
    reviews: &[RowRecord],
  ) -> Result<String, AnalysisError> {
    let limited = self.limit_reviews(reviews);
    let prompt = build_prompt(product_name, limited);
    debug!(
      product = product_name,
      sent = limited.len(),
      total = reviews.len(),
      "requesting model analysis"
    );

    match timeout(self.deadline, self.generator.generate(&prompt)).await {
      Ok(result) => result,
      Err(_) => Err(AnalysisError::timeout(self.deadline)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analysis::types::REVIEW_TEXT;
  use std::sync::Mutex;

  /// Records prompts and answers with a fixed reply
  struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
    reply: Result<String, AnalysisError>,
  }

  impl RecordingGenerator {
    fn replying(reply: Result<String, AnalysisError>) -> Self {
      Self { prompts: Mutex::new(Vec::new()), reply }
    }
  }

  #[async_trait]
  impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
      self.prompts.lock().unwrap().push(prompt.to_string());
      self.reply.clone()
    }
  }

  struct StalledGenerator;

  #[async_trait]
  impl TextGenerator for StalledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AnalysisError> {
      tokio::time::sleep(Duration::from_secs(3600)).await;
      Ok(String::new())
    }
  }

  fn reviews(count: usize) -> Vec<RowRecord> {
    (1..=count)
      .map(|i| RowRecord::from_pairs([(REVIEW_TEXT, format!("review number {i}"))]))
      .collect()
  }

  #[tokio::test]
  async fn test_request_truncates_to_max_reviews() {
    let generator = Arc::new(RecordingGenerator::replying(Ok("{}".to_string())));
    let requester = AnalysisRequester::new(generator.clone(), &PipelineConfig::default());

    let raw = requester.request_analysis("Widget", &reviews(25)).await.unwrap();

    assert_eq!(raw, "{}");
    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("20. review number 20\n"));
    assert!(!prompts[0].contains("review number 21"));
  }

  #[tokio::test]
  async fn test_request_passes_generator_errors_through() {
    let generator = Arc::new(RecordingGenerator::replying(Err(AnalysisError::upstream("503"))));
    let requester = AnalysisRequester::new(generator, &PipelineConfig::default());

    let result = requester.request_analysis("Widget", &reviews(2)).await;
    assert_eq!(result, Err(AnalysisError::upstream("503")));
  }

  #[tokio::test(start_paused = true)]
  async fn test_request_deadline_expires() {
    let config =
      PipelineConfig { request_timeout: Duration::from_secs(5), ..PipelineConfig::default() };
    let requester = AnalysisRequester::new(Arc::new(StalledGenerator), &config);

    let result = requester.request_analysis("Widget", &reviews(1)).await;
    assert_eq!(result, Err(AnalysisError::Timeout { seconds: 5 }));
  }

  #[test]
  fn test_limit_reviews_keeps_short_inputs() {
    let config = PipelineConfig { max_reviews: 3, ..PipelineConfig::default() };
    let requester = AnalysisRequester::new(Arc::new(StalledGenerator), &config);

    assert_eq!(requester.limit_reviews(&reviews(2)).len(), 2);
    assert_eq!(requester.limit_reviews(&reviews(5)).len(), 3);
    assert!(requester.limit_reviews(&[]).is_empty());
  }

  #[test]
  fn test_gemini_reply_text_extraction() {
    let reply: GenerateResponse = serde_json::from_str(
      r#"{"candidates":[{"content":{"parts":[
        {"text":"{\"category\":\"Books\"}"},
        {"text":"ignored"}
      ]}}]}"#,
    )
    .unwrap();
    assert_eq!(reply.into_text().as_deref(), Some(r#"{"category":"Books"}"#));

    let empty: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
    assert_eq!(empty.into_text(), None);
  }

  #[tokio::test]
  async fn test_gemini_without_credential_fails_fast() {
    let config = ModelConfig::new(None, url::Url::parse("http://127.0.0.1:9/unused").unwrap());
    let client = GeminiClient::new(config).unwrap();

    let result = client.generate("hello").await;
    assert!(matches!(result, Err(AnalysisError::UpstreamRequest { .. })));
  }
}
