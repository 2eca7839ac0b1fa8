//! Command-line front end

pub mod commands;
pub mod display;

use clap::ValueEnum;

/// How analysis records are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  /// Colored multi-line view per product
  #[default]
  Pretty,
  /// JSON array of analysis records
  Json,
  /// One tab-separated line per product
  Compact,
}
