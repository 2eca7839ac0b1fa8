//! Model-free analysis
//!
//! Every function here is pure and deterministic and works on an empty review
//! set. The pipeline uses them both for full fallback records and to fill the
//! gaps in partial model replies.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::types::{
  AnalysisRecord, AnalysisSource, FeatureEntry, FeatureTable, RowRecord, Sentiment, Summary,
  RATING, SENTIMENT,
};

pub const GENERAL_CATEGORY: &str = "General Product";

/// Leading decimal literal with an optional exponent, as `parseFloat` reads it
static RATING_PREFIX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
    .expect("rating pattern compiles")
});

/// (name keyword, review-text keyword, category); first match wins
const CATEGORY_RULES: &[(&str, &str, &str)] = &[
  ("phone", "battery", "Electronics - Phone"),
  ("laptop", "screen", "Electronics - Laptop"),
  ("shirt", "fabric", "Clothing"),
  ("chair", "assembly", "Furniture"),
  ("book", "story", "Books"),
];

/// (feature, share of reviews counted as mentions, positive phrase, negative phrase)
const BASIC_FEATURES: &[(&str, f64, &str, &str)] = &[
  ("Quality", 0.4, "Good quality", "Poor quality"),
  ("Value", 0.3, "Great value", "Overpriced"),
  ("Performance", 0.3, "Performs well", "Issues encountered"),
];

/// Phrase lists keyed off the category name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
  Electronics,
  Clothing,
  Books,
  General,
}

impl Bucket {
  fn for_category(category: &str) -> Self {
    let category = category.to_lowercase();
    if category.contains("phone") || category.contains("laptop") {
      Bucket::Electronics
    } else if category.contains("clothing") {
      Bucket::Clothing
    } else if category.contains("book") {
      Bucket::Books
    } else {
      Bucket::General
    }
  }

  fn most_appreciated(self) -> [&'static str; 3] {
    match self {
      Bucket::Electronics => ["Great performance", "Good battery life", "Excellent display"],
      Bucket::Clothing => ["Nice fabric", "Good fit", "Stylish design"],
      Bucket::Books => ["Great story", "Well-written", "Engaging read"],
      Bucket::General => ["Reliable", "Good quality", "Value for money"],
    }
  }

  fn least_appreciated(self) -> [&'static str; 3] {
    match self {
      Bucket::Electronics => ["Battery drains fast", "Heating issues", "Customer service"],
      Bucket::Clothing => ["Size mismatch", "Color fades", "Low quality stitching"],
      Bucket::Books => ["Boring story", "Poor editing", "Weak plot"],
      Bucket::General => ["Late delivery", "Packaging issues", "Not worth the price"],
    }
  }
}

/// Guess a category from the product name and the review text
pub fn infer_category(product_name: &str, reviews: &[RowRecord]) -> String {
  let name = product_name.to_lowercase();
  let text =
    reviews.iter().map(RowRecord::review_text).collect::<Vec<_>>().join(" ").to_lowercase();

  CATEGORY_RULES
    .iter()
    .find(|(name_keyword, text_keyword, _)| {
      name.contains(name_keyword) || text.contains(text_keyword)
    })
    .map(|(_, _, category)| category.to_string())
    .unwrap_or_else(|| GENERAL_CATEGORY.to_string())
}

/// Fixed three-feature table scaled by review count.
///
/// Mention counts are a coarse proxy (`floor(count * weight)`), not text
/// analysis.
pub fn extract_basic_features(reviews: &[RowRecord]) -> FeatureTable {
  let count = reviews.len() as f64;
  BASIC_FEATURES
    .iter()
    .map(|(name, weight, positive, negative)| {
      let mentions = (count * weight).floor() as u64;
      (name.to_string(), FeatureEntry::new(&[*positive], &[*negative], mentions))
    })
    .collect()
}

/// Overall sentiment from explicit labels, else ratings, else neutral
pub fn calculate_overall_sentiment(reviews: &[RowRecord]) -> Sentiment {
  if reviews.is_empty() {
    return Sentiment::Neutral;
  }

  let labels: Vec<Sentiment> =
    reviews.iter().filter_map(|review| Sentiment::parse(review.get(SENTIMENT))).collect();

  if !labels.is_empty() {
    let positive = labels.iter().filter(|s| **s == Sentiment::Positive).count();
    let negative = labels.iter().filter(|s| **s == Sentiment::Negative).count();
    return match positive.cmp(&negative) {
      std::cmp::Ordering::Greater => Sentiment::Positive,
      std::cmp::Ordering::Less => Sentiment::Negative,
      std::cmp::Ordering::Equal => Sentiment::Neutral,
    };
  }

  let ratings: Vec<f64> =
    reviews.iter().filter_map(|review| parse_rating(review.get(RATING))).collect();

  if ratings.is_empty() {
    return Sentiment::Neutral;
  }

  let average = ratings.iter().sum::<f64>() / ratings.len() as f64;
  if average >= 4.0 {
    Sentiment::Positive
  } else if average <= 2.0 {
    Sentiment::Negative
  } else {
    Sentiment::Neutral
  }
}

/// Leading number of a rating cell (`"4"`, `" 4.5 stars"`, `"3/5"`, `"1e1"`).
///
/// An exponent is only consumed when digits follow it (`"2e"` reads as 2).
/// Non-finite values are rejected.
pub fn parse_rating(value: &str) -> Option<f64> {
  let literal = RATING_PREFIX.find(value.trim_start())?.as_str();
  literal.trim_end_matches('.').parse::<f64>().ok().filter(|rating| rating.is_finite())
}

/// Canned strengths for a category; `reviews` is not consulted
pub fn generate_most_appreciated(_reviews: &[RowRecord], category: &str) -> Vec<String> {
  Bucket::for_category(category).most_appreciated().iter().map(|s| s.to_string()).collect()
}

/// Canned weaknesses for a category; `reviews` is not consulted
pub fn generate_least_appreciated(_reviews: &[RowRecord], category: &str) -> Vec<String> {
  Bucket::for_category(category).least_appreciated().iter().map(|s| s.to_string()).collect()
}

/// Complete analysis record without any model involvement
pub fn fallback_analysis(product_name: &str, reviews: &[RowRecord]) -> AnalysisRecord {
  let category = infer_category(product_name, reviews);

  AnalysisRecord {
    product_name: product_name.to_string(),
    features: extract_basic_features(reviews),
    summary: Summary {
      most_appreciated: generate_most_appreciated(reviews, &category),
      least_appreciated: generate_least_appreciated(reviews, &category),
      overall_sentiment: calculate_overall_sentiment(reviews),
    },
    category,
    review_count: reviews.len(),
    source: AnalysisSource::Heuristic,
  }
}
