//! Prompt construction for the review summarizer

use std::fmt::Write;

use crate::analysis::types::RowRecord;

const RESPONSE_SCHEMA: &str = r#"{
  "category": "string",
  "features": {
    "FeatureName": {
      "positive": [ "string" ],
      "negative": [ "string" ],
      "mentions": number
    }
  },
  "mostAppreciated": [ "string" ],
  "leastAppreciated": [ "string" ],
  "overallSentiment": "positive" | "neutral" | "negative"
}"#;

/// Instruction text for one product.
///
/// Reviews are numbered from 1 in the order given; callers truncate first.
pub fn build_prompt(product_name: &str, reviews: &[RowRecord]) -> String {
  let mut prompt = String::new();

  let _ = writeln!(
    prompt,
    "You are an intelligent review summarizer. Based on the reviews provided for the product \
     \"{product_name}\", respond ONLY with a strict JSON object in the following format, with no \
     markdown and no commentary:"
  );
  let _ = writeln!(prompt);
  let _ = writeln!(prompt, "{RESPONSE_SCHEMA}");
  let _ = writeln!(prompt);
  let _ = writeln!(prompt, "Here are the reviews:");
  let _ = writeln!(prompt);

  for (index, review) in reviews.iter().enumerate() {
    let _ = writeln!(prompt, "{}. {}", index + 1, review.review_text());
  }

  let _ = writeln!(prompt);
  let _ = write!(
    prompt,
    "REMEMBER: Respond ONLY with valid JSON. Do NOT wrap it in markdown code fences. \
     Do NOT explain anything."
  );

  prompt
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analysis::types::REVIEW_TEXT;

  #[test]
  fn test_prompt_embeds_name_and_numbered_reviews() {
    let reviews = [
      RowRecord::from_pairs([(REVIEW_TEXT, "Battery lasts two days")]),
      RowRecord::from_pairs([(REVIEW_TEXT, "Camera is blurry")]),
    ];

    let prompt = build_prompt("Pixel Pro", &reviews);

    assert!(prompt.contains("\"Pixel Pro\""));
    assert!(prompt.contains("1. Battery lasts two days\n"));
    assert!(prompt.contains("2. Camera is blurry\n"));
    assert!(!prompt.contains("3. "));
  }

  #[test]
  fn test_prompt_documents_schema_fields() {
    let prompt = build_prompt("Anything", &[]);

    let fields =
      ["category", "features", "mostAppreciated", "leastAppreciated", "overallSentiment"];
    for field in fields {
      assert!(prompt.contains(field), "prompt should mention {field}");
    }
    assert!(prompt.contains("ONLY with valid JSON"));
  }
}
