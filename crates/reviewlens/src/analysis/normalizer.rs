//! Model reply validation and repair
//!
//! Replies are gated strictly: anything that is not a JSON object is rejected
//! so garbage never reaches a record. Inside an accepted object each field is
//! taken only when present and well-typed; everything else is filled in by
//! the heuristics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::analysis::heuristics;
use crate::analysis::types::{
  AnalysisRecord, AnalysisSource, FeatureEntry, FeatureTable, RowRecord, Sentiment, Summary,
};
use crate::error::AnalysisError;

static JSON_FENCE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("fence pattern compiles"));

/// Strip markdown fencing from a model reply.
///
/// A ```` ```json ```` block wins outright; otherwise stray fences are removed.
pub fn extract_json_text(raw: &str) -> String {
  let trimmed = raw.trim();

  if let Some(inner) = JSON_FENCE.captures(trimmed).and_then(|captures| captures.get(1)) {
    return inner.as_str().trim().to_string();
  }

  trimmed.replace("```", "").trim().to_string()
}

/// Parse a model reply into a JSON object or fail with `MalformedResponse`
pub fn parse_analysis_object(raw: &str) -> Result<Map<String, Value>, AnalysisError> {
  let cleaned = extract_json_text(raw);

  match serde_json::from_str::<Value>(&cleaned) {
    Ok(Value::Object(object)) => Ok(object),
    Ok(other) => Err(AnalysisError::malformed(format!(
      "expected a JSON object, got {}",
      json_kind(&other)
    ))),
    Err(e) => Err(AnalysisError::malformed(format!("invalid JSON: {e}"))),
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Fields a model reply supplied, each present only when well-typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialAnalysis {
  pub category: Option<String>,
  pub features: Option<FeatureTable>,
  pub most_appreciated: Option<Vec<String>>,
  pub least_appreciated: Option<Vec<String>>,
  pub overall_sentiment: Option<Sentiment>,
}

impl PartialAnalysis {
  /// Read the known fields out of a reply object.
  ///
  /// Summary fields are looked up at the top level first, then inside a
  /// nested `summary` object.
  pub fn from_object(object: &Map<String, Value>) -> Self {
    let summary = object.get("summary").and_then(Value::as_object);
    let lookup = |key: &str| {
      let top = object.get(key);
      let nested = summary.and_then(|summary| summary.get(key));
      (top, nested)
    };

    let (top, nested) = lookup("mostAppreciated");
    let most_appreciated = top.and_then(parse_phrases).or_else(|| nested.and_then(parse_phrases));

    let (top, nested) = lookup("leastAppreciated");
    let least_appreciated = top.and_then(parse_phrases).or_else(|| nested.and_then(parse_phrases));

    let (top, nested) = lookup("overallSentiment");
    let overall_sentiment =
      top.and_then(parse_sentiment).or_else(|| nested.and_then(parse_sentiment));

    Self {
      category: object.get("category").and_then(parse_category),
      features: object.get("features").and_then(parse_features),
      most_appreciated,
      least_appreciated,
      overall_sentiment,
    }
  }

  /// Merge over heuristic defaults.
  ///
  /// Default appreciation lists follow the resolved category, whichever side
  /// it came from.
  pub fn into_record(self, product_name: &str, reviews: &[RowRecord]) -> AnalysisRecord {
    let category =
      self.category.unwrap_or_else(|| heuristics::infer_category(product_name, reviews));
    let features = self.features.unwrap_or_else(|| heuristics::extract_basic_features(reviews));
    let most_appreciated = self
      .most_appreciated
      .unwrap_or_else(|| heuristics::generate_most_appreciated(reviews, &category));
    let least_appreciated = self
      .least_appreciated
      .unwrap_or_else(|| heuristics::generate_least_appreciated(reviews, &category));
    let overall_sentiment = self
      .overall_sentiment
      .unwrap_or_else(|| heuristics::calculate_overall_sentiment(reviews));

    AnalysisRecord {
      product_name: product_name.to_string(),
      category,
      features,
      summary: Summary { most_appreciated, least_appreciated, overall_sentiment },
      review_count: reviews.len(),
      source: AnalysisSource::Model,
    }
  }
}

fn parse_category(value: &Value) -> Option<String> {
  value.as_str().map(str::trim).filter(|category| !category.is_empty()).map(str::to_string)
}

fn parse_phrases(value: &Value) -> Option<Vec<String>> {
  value.as_array()?.iter().map(|item| item.as_str().map(str::to_string)).collect()
}

fn parse_sentiment(value: &Value) -> Option<Sentiment> {
  value.as_str().and_then(Sentiment::parse)
}

/// Entries that are not objects or fail to deserialize are dropped; a table
/// whose entries were all dropped counts as absent, an empty one does not.
fn parse_features(value: &Value) -> Option<FeatureTable> {
  let object = value.as_object()?;

  let table: FeatureTable = object
    .iter()
    .filter(|(_, entry)| entry.is_object())
    .filter_map(|(name, entry)| {
      serde_json::from_value::<FeatureEntry>(entry.clone()).ok().map(|entry| (name.clone(), entry))
    })
    .collect();

  if table.is_empty() && !object.is_empty() {
    return None;
  }
  Some(table)
}

/// Validate a raw model reply and turn it into an analysis record.
///
/// `review_count` always comes from `reviews`, never from the reply.
pub fn normalize(
  raw: &str,
  reviews: &[RowRecord],
  product_name: &str,
) -> Result<AnalysisRecord, AnalysisError> {
  let object = parse_analysis_object(raw)?;
  let partial = PartialAnalysis::from_object(&object);
  Ok(partial.into_record(product_name, reviews))
}
