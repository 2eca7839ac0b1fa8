use async_trait::async_trait;
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;

use reviewlens::analysis::csv::read_document;
use reviewlens::analysis::heuristics::{fallback_analysis, GENERAL_CATEGORY};
use reviewlens::analysis::{
  group_by_product, AnalysisSource, FeatureEntry, Pipeline, Sentiment, TextGenerator,
};
use reviewlens::config::PipelineConfig;
use reviewlens::error::AnalysisError;

mock! {
  pub Generator {}

  #[async_trait]
  impl TextGenerator for Generator {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
  }
}

const TWO_PRODUCTS: &str = "\
product_id,review_text,rating
P1,Solid build,5
P1,Does the job,4
P2,Broke in a week,1
P1,Would buy again,5
P2,Not great,2
";

fn failing_generator() -> MockGenerator {
  let mut generator = MockGenerator::new();
  generator
    .expect_generate()
    .returning(|_| Err(AnalysisError::upstream("503 Service Unavailable")));
  generator
}

#[tokio::test]
async fn test_end_to_end_with_failing_model() {
  let rows = read_document(TWO_PRODUCTS).unwrap();
  let pipeline =
    Pipeline::from_generator(Arc::new(failing_generator()), &PipelineConfig::default());

  let records = pipeline.run(rows).await;

  assert_eq!(records.len(), 2);
  let (p1, p2) = (&records[0], &records[1]);

  assert_eq!(p1.product_name, "P1");
  assert_eq!(p1.review_count, 3);
  assert_eq!(p1.summary.overall_sentiment, Sentiment::Positive);
  assert_eq!(p1.category, GENERAL_CATEGORY);
  assert_eq!(p1.source, AnalysisSource::Heuristic);
  assert_eq!(p1.features["Quality"], FeatureEntry::new(&["Good quality"], &["Poor quality"], 1));
  assert_eq!(p1.features["Value"].mentions, 0);
  assert_eq!(p1.features["Performance"].mentions, 0);

  assert_eq!(p2.product_name, "P2");
  assert_eq!(p2.review_count, 2);
  assert_eq!(p2.summary.overall_sentiment, Sentiment::Negative);
  assert_eq!(p2.category, GENERAL_CATEGORY);
  assert_eq!(p2.source, AnalysisSource::Heuristic);
  assert_eq!(p2.features.len(), 3);
  assert!(p2.features.values().all(|entry| entry.mentions == 0));
}

#[tokio::test]
async fn test_model_reply_is_merged_and_tagged() {
  let mut generator = MockGenerator::new();
  generator
    .expect_generate()
    .withf(|prompt: &str| prompt.contains("\"P1\""))
    .times(1)
    .returning(|_| {
      let body = r#"{"category": "Hardware", "overallSentiment": "neutral", "reviewCount": 40}"#;
      Ok(format!("```json\n{body}\n```"))
    });
  generator
    .expect_generate()
    .withf(|prompt: &str| prompt.contains("\"P2\""))
    .times(1)
    .returning(|_| Ok("I'm sorry, I can't produce JSON today.".to_string()));

  let pipeline = Pipeline::from_generator(Arc::new(generator), &PipelineConfig::default());
  let records = pipeline.run(read_document(TWO_PRODUCTS).unwrap()).await;

  assert_eq!(records[0].source, AnalysisSource::Model);
  assert_eq!(records[0].category, "Hardware");
  assert_eq!(records[0].summary.overall_sentiment, Sentiment::Neutral);
  assert_eq!(records[0].review_count, 3);

  let groups = group_by_product(read_document(TWO_PRODUCTS).unwrap());
  assert_eq!(records[1], fallback_analysis("P2", &groups[1].rows));
}

#[tokio::test]
async fn test_prompt_carries_every_review_in_order() {
  let mut generator = MockGenerator::new();
  generator
    .expect_generate()
    .withf(|prompt: &str| {
      prompt.contains("1. Solid build\n")
        && prompt.contains("2. Does the job\n")
        && prompt.contains("3. Would buy again\n")
    })
    .times(1)
    .returning(|_| Ok("{}".to_string()));
  generator.expect_generate().returning(|_| Ok("{}".to_string()));

  let pipeline = Pipeline::from_generator(Arc::new(generator), &PipelineConfig::default());
  let records = pipeline.run(read_document(TWO_PRODUCTS).unwrap()).await;

  assert!(records.iter().all(|record| record.source == AnalysisSource::Model));
}

/// Sleeps longer for earlier products so completions arrive out of order
struct StaggeredGenerator;

#[async_trait]
impl TextGenerator for StaggeredGenerator {
  async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
    let delay = if prompt.contains("\"A\"") {
      300
    } else if prompt.contains("\"B\"") {
      200
    } else {
      100
    };
    tokio::time::sleep(Duration::from_millis(delay)).await;
    Ok(r#"{"category": "Staggered"}"#.to_string())
  }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_batch_keeps_discovery_order() {
  let rows = read_document("product_id,review_text\nA,one\nB,two\nC,three\nA,four\n").unwrap();
  let config = PipelineConfig { concurrency: 3, ..PipelineConfig::default() };
  let pipeline = Pipeline::from_generator(Arc::new(StaggeredGenerator), &config);

  let records = pipeline.run(rows).await;

  let names: Vec<&str> = records.iter().map(|record| record.product_name.as_str()).collect();
  assert_eq!(names, ["A", "B", "C"]);
  assert_eq!(records[0].review_count, 2);
  assert!(records.iter().all(|record| record.category == "Staggered"));
}

struct HangingGenerator;

#[async_trait]
impl TextGenerator for HangingGenerator {
  async fn generate(&self, _prompt: &str) -> Result<String, AnalysisError> {
    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
    Ok(r#"{"category": "Too Late"}"#.to_string())
  }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expiry_falls_back() {
  let config =
    PipelineConfig { request_timeout: Duration::from_secs(2), ..PipelineConfig::default() };
  let pipeline = Pipeline::from_generator(Arc::new(HangingGenerator), &config);

  let records = pipeline.run(read_document(TWO_PRODUCTS).unwrap()).await;

  assert_eq!(records.len(), 2);
  assert!(records.iter().all(|record| record.source == AnalysisSource::Heuristic));
  assert_eq!(records[0].summary.overall_sentiment, Sentiment::Positive);
}

#[test]
fn test_heuristics_are_idempotent() {
  let groups = group_by_product(read_document(TWO_PRODUCTS).unwrap());

  for group in &groups {
    let first = fallback_analysis(&group.product_name, &group.rows);
    let second = fallback_analysis(&group.product_name, &group.rows);
    assert_eq!(first, second);
    assert_eq!(
      serde_json::to_string(&first).unwrap(),
      serde_json::to_string(&second).unwrap()
    );
  }
}
