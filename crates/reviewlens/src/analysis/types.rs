//! Data model shared by every pipeline stage

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// Column names
// ============

pub const REVIEW_TEXT: &str = "review_text";
pub const PRODUCT_ID: &str = "product_id";
pub const PRODUCT_TITLE: &str = "product_title";
pub const RATING: &str = "rating";
pub const SENTIMENT: &str = "sentiment";

/// Key and display name for rows that carry neither an id nor a title
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

// Row Records
// ===========

/// One parsed CSV data line, keyed by lower-cased column name.
///
/// Deserializing from JSON (the HTTP boundary) lower-cases keys, stringifies
/// scalar values and maps `null` to the empty string; nested arrays and
/// objects are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, String>")]
pub struct RowRecord {
  fields: BTreeMap<String, String>,
  product_name: Option<String>,
}

impl RowRecord {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a row from column/value pairs, keys taken as given
  pub fn from_pairs<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    let fields = pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect();
    Self { fields, product_name: None }
  }

  pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
    self.fields.insert(column.into(), value.into());
  }

  /// Value of a column, or `""` when the row does not have it
  pub fn get(&self, column: &str) -> &str {
    self.fields.get(column).map(String::as_str).unwrap_or("")
  }

  /// Value of a column only when it is present and non-empty
  pub fn non_empty(&self, column: &str) -> Option<&str> {
    self.fields.get(column).map(String::as_str).filter(|value| !value.is_empty())
  }

  pub fn review_text(&self) -> &str {
    self.get(REVIEW_TEXT)
  }

  pub fn fields(&self) -> &BTreeMap<String, String> {
    &self.fields
  }

  /// Product name resolved by the grouper, if the row has been grouped
  pub fn product_name(&self) -> Option<&str> {
    self.product_name.as_deref()
  }

  pub(crate) fn with_product_name(mut self, name: impl Into<String>) -> Self {
    self.product_name = Some(name.into());
    self
  }
}

// Equality is over column data; the grouper's annotation is derived from it.
impl PartialEq for RowRecord {
  fn eq(&self, other: &Self) -> bool {
    self.fields == other.fields
  }
}

impl Eq for RowRecord {}

impl From<BTreeMap<String, Value>> for RowRecord {
  fn from(raw: BTreeMap<String, Value>) -> Self {
    let fields = raw
      .into_iter()
      .filter_map(|(column, value)| {
        let value = match value {
          Value::String(text) => text,
          Value::Null => String::new(),
          Value::Bool(flag) => flag.to_string(),
          Value::Number(number) => number.to_string(),
          Value::Array(_) | Value::Object(_) => return None,
        };
        Some((column.trim().to_lowercase(), value))
      })
      .collect();
    Self { fields, product_name: None }
  }
}

impl From<RowRecord> for BTreeMap<String, String> {
  fn from(row: RowRecord) -> Self {
    row.fields
  }
}

// Sentiment
// =========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
  Positive,
  Neutral,
  Negative,
}

impl Sentiment {
  pub fn as_str(&self) -> &'static str {
    match self {
      Sentiment::Positive => "positive",
      Sentiment::Neutral => "neutral",
      Sentiment::Negative => "negative",
    }
  }

  /// Case-insensitive match against the three literals
  pub fn parse(value: &str) -> Option<Self> {
    match value.trim().to_lowercase().as_str() {
      "positive" => Some(Sentiment::Positive),
      "neutral" => Some(Sentiment::Neutral),
      "negative" => Some(Sentiment::Negative),
      _ => None,
    }
  }
}

impl fmt::Display for Sentiment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Features
// ========

/// Phrases praising and criticising one product feature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEntry {
  #[serde(default)]
  pub positive: Vec<String>,

  #[serde(default)]
  pub negative: Vec<String>,

  #[serde(default, deserialize_with = "deserialize_mentions")]
  pub mentions: u64,
}

impl FeatureEntry {
  pub fn new(positive: &[&str], negative: &[&str], mentions: u64) -> Self {
    Self {
      positive: positive.iter().map(|phrase| phrase.to_string()).collect(),
      negative: negative.iter().map(|phrase| phrase.to_string()).collect(),
      mentions,
    }
  }
}

/// Feature name to entry
pub type FeatureTable = BTreeMap<String, FeatureEntry>;

/// Models sometimes answer `3.0` for a count; anything non-negative is floored.
fn deserialize_mentions<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  if let Some(count) = value.as_u64() {
    return Ok(count);
  }
  match value.as_f64() {
    Some(count) if count.is_finite() && count >= 0.0 => Ok(count.floor() as u64),
    _ => Err(de::Error::custom(format!("mentions must be a non-negative number, got {value}"))),
  }
}

// Analysis Records
// ================

/// Which path produced an analysis record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
  Model,
  Heuristic,
}

impl fmt::Display for AnalysisSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AnalysisSource::Model => f.write_str("model"),
      AnalysisSource::Heuristic => f.write_str("heuristic"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub most_appreciated: Vec<String>,
  pub least_appreciated: Vec<String>,
  pub overall_sentiment: Sentiment,
}

/// Canonical per-product output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
  pub product_name: String,
  pub category: String,
  pub features: FeatureTable,
  pub summary: Summary,
  /// Rows in the originating product group, never taken from the model
  pub review_count: usize,
  pub source: AnalysisSource,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_row_record_from_json_normalizes_values() {
    let row: RowRecord = serde_json::from_value(json!({
      "Review_Text": "Solid",
      "rating": 4.5,
      "verified": true,
      "sentiment": null,
      "tags": ["a", "b"]
    }))
    .unwrap();

    assert_eq!(row.review_text(), "Solid");
    assert_eq!(row.get(RATING), "4.5");
    assert_eq!(row.get("verified"), "true");
    assert_eq!(row.get(SENTIMENT), "");
    assert_eq!(row.non_empty(SENTIMENT), None);
    assert!(!row.fields().contains_key("tags"));
  }

  #[test]
  fn test_row_equality_ignores_grouping_annotation() {
    let row = RowRecord::from_pairs([(REVIEW_TEXT, "fine"), (PRODUCT_ID, "P1")]);
    let annotated = row.clone().with_product_name("P1");

    assert_eq!(row, annotated);
    assert_eq!(annotated.product_name(), Some("P1"));
    assert_eq!(row.product_name(), None);
  }

  #[test]
  fn test_sentiment_parse_is_case_insensitive() {
    assert_eq!(Sentiment::parse("Positive"), Some(Sentiment::Positive));
    assert_eq!(Sentiment::parse(" NEGATIVE "), Some(Sentiment::Negative));
    assert_eq!(Sentiment::parse("neutral"), Some(Sentiment::Neutral));
    assert_eq!(Sentiment::parse("mixed"), None);
    assert_eq!(Sentiment::parse(""), None);
  }

  #[test]
  fn test_feature_entry_accepts_float_mentions() {
    let entry: FeatureEntry =
      serde_json::from_value(json!({ "positive": ["Sharp"], "mentions": 3.0 })).unwrap();
    assert_eq!(entry.mentions, 3);
    assert!(entry.negative.is_empty());

    let negative = serde_json::from_value::<FeatureEntry>(json!({ "mentions": -1 }));
    assert!(negative.is_err());
  }

  #[test]
  fn test_analysis_record_serializes_camel_case() {
    let record = AnalysisRecord {
      product_name: "Desk Lamp".to_string(),
      category: "General Product".to_string(),
      features: FeatureTable::new(),
      summary: Summary {
        most_appreciated: vec!["Bright".to_string()],
        least_appreciated: vec![],
        overall_sentiment: Sentiment::Neutral,
      },
      review_count: 2,
      source: AnalysisSource::Heuristic,
    };

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["productName"], "Desk Lamp");
    assert_eq!(value["reviewCount"], 2);
    assert_eq!(value["summary"]["overallSentiment"], "neutral");
    assert_eq!(value["summary"]["mostAppreciated"][0], "Bright");
    assert_eq!(value["source"], "heuristic");
  }
}
