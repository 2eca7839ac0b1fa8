use anyhow::{bail, Context, Result};
use colored::*;
use std::path::Path;
use tracing::info;

use crate::analysis::csv::read_document;
use crate::analysis::{AnalysisRecord, AnalysisSource, Pipeline, RowRecord};
use crate::cli::display::render;
use crate::cli::OutputFormat;

/// Only files with a `.csv` extension (any case) are accepted
pub fn ensure_csv_path(path: &Path) -> Result<()> {
  let is_csv = path
    .extension()
    .and_then(|extension| extension.to_str())
    .is_some_and(|extension| extension.eq_ignore_ascii_case("csv"));

  if !is_csv {
    bail!("Please select a CSV file: {}", path.display());
  }
  Ok(())
}

/// Read and validate a CSV file into row records
pub async fn load_rows(path: &Path) -> Result<Vec<RowRecord>> {
  ensure_csv_path(path)?;

  let text = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("Failed to read {}", path.display()))?;

  let rows = read_document(&text).with_context(|| format!("Invalid CSV file {}", path.display()))?;
  info!(path = %path.display(), rows = rows.len(), "loaded review rows");
  Ok(rows)
}

/// Analyze every product in a CSV file and print the results
pub async fn analyze_file(
  pipeline: &Pipeline,
  path: &Path,
  format: OutputFormat,
) -> Result<Vec<AnalysisRecord>> {
  let rows = load_rows(path).await?;
  let records = pipeline.run(rows).await;

  println!("{}", render(&records, format)?);

  if format == OutputFormat::Pretty {
    let fallbacks =
      records.iter().filter(|record| record.source == AnalysisSource::Heuristic).count();
    if fallbacks > 0 {
      eprintln!(
        "{} {fallbacks} of {} products used heuristic analysis",
        "!".yellow(),
        records.len()
      );
    }
  }

  Ok(records)
}
