//! Display formatting utilities for CLI output

use anyhow::{Context, Result};
use colored::*;
use std::fmt::Write;

use crate::analysis::{AnalysisRecord, AnalysisSource, Sentiment};
use crate::cli::OutputFormat;

fn colored_sentiment(sentiment: Sentiment) -> ColoredString {
  match sentiment {
    Sentiment::Positive => sentiment.as_str().green(),
    Sentiment::Neutral => sentiment.as_str().yellow(),
    Sentiment::Negative => sentiment.as_str().red(),
  }
}

fn colored_source(source: AnalysisSource) -> ColoredString {
  match source {
    AnalysisSource::Model => source.to_string().cyan(),
    AnalysisSource::Heuristic => source.to_string().dimmed(),
  }
}

fn join_or_none(items: &[String]) -> String {
  if items.is_empty() {
    "none".to_string()
  } else {
    items.join(", ")
  }
}

/// Multi-line view of one record
pub fn render_record(record: &AnalysisRecord) -> String {
  let mut out = String::new();

  let _ = writeln!(
    out,
    "=== {} === {} [{}]",
    record.product_name.blue().bold(),
    record.category.yellow(),
    colored_source(record.source)
  );
  let sentiment = colored_sentiment(record.summary.overall_sentiment);
  let _ = writeln!(out, "  Sentiment:         {}", sentiment);
  let _ = writeln!(out, "  Reviews:           {}", record.review_count);
  let _ = writeln!(out, "  Most appreciated:  {}", join_or_none(&record.summary.most_appreciated));
  let _ = writeln!(out, "  Least appreciated: {}", join_or_none(&record.summary.least_appreciated));

  if !record.features.is_empty() {
    let _ = writeln!(out, "  Features:");
    for (name, entry) in &record.features {
      let _ = writeln!(out, "    {} ({} mentions)", name.bold(), entry.mentions);
      for phrase in &entry.positive {
        let _ = writeln!(out, "      {} {phrase}", "+".green());
      }
      for phrase in &entry.negative {
        let _ = writeln!(out, "      {} {phrase}", "-".red());
      }
    }
  }

  out
}

/// One line per record: name, category, sentiment, review count, source
pub fn render_compact(record: &AnalysisRecord) -> String {
  format!(
    "{}\t{}\t{}\t{}\t{}",
    record.product_name,
    record.category,
    record.summary.overall_sentiment,
    record.review_count,
    record.source
  )
}

/// Render a batch in the requested format
pub fn render(records: &[AnalysisRecord], format: OutputFormat) -> Result<String> {
  match format {
    OutputFormat::Json => {
      serde_json::to_string_pretty(records).context("Failed to serialize analysis results")
    }
    OutputFormat::Compact => {
      Ok(records.iter().map(render_compact).collect::<Vec<_>>().join("\n"))
    }
    OutputFormat::Pretty => {
      if records.is_empty() {
        return Ok("No products found.".to_string());
      }
      Ok(records.iter().map(render_record).collect::<Vec<_>>().join("\n"))
    }
  }
}
