//! Batch orchestration
//!
//! Group rows, run each product through the model path, and fall back to the
//! heuristics for any product whose model path fails. A batch never aborts
//! because of a single product.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analysis::grouping::{group_by_product, ProductGroup};
use crate::analysis::heuristics::fallback_analysis;
use crate::analysis::normalizer::normalize;
use crate::analysis::requester::{AnalysisRequester, TextGenerator};
use crate::analysis::types::{AnalysisRecord, AnalysisSource, RowRecord};
use crate::config::PipelineConfig;

#[derive(Clone)]
pub struct Pipeline {
  requester: AnalysisRequester,
  concurrency: usize,
}

impl Pipeline {
  pub fn new(requester: AnalysisRequester, config: &PipelineConfig) -> Self {
    Self { requester, concurrency: config.concurrency.max(1) }
  }

  pub fn from_generator(generator: Arc<dyn TextGenerator>, config: &PipelineConfig) -> Self {
    Self::new(AnalysisRequester::new(generator, config), config)
  }

  pub fn requester(&self) -> &AnalysisRequester {
    &self.requester
  }

  /// Analyze every product in `rows`, one record per product in first-seen order
  pub async fn run(&self, rows: Vec<RowRecord>) -> Vec<AnalysisRecord> {
    let groups = group_by_product(rows);
    debug!(products = groups.len(), "grouped rows by product");
    self.run_groups(&groups).await
  }

  /// Analyze pre-grouped products with at most `concurrency` requests in flight
  pub async fn run_groups(&self, groups: &[ProductGroup]) -> Vec<AnalysisRecord> {
    // Futures own their inputs; the batch future must be `Send`
    let mut indexed: Vec<(usize, AnalysisRecord)> =
      stream::iter(groups.iter().cloned().enumerate())
        .map(|(index, group)| {
          let pipeline = self.clone();
          async move { (index, pipeline.analyze_group(&group).await) }
        })
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

    indexed.sort_by_key(|(index, _)| *index);
    let records: Vec<AnalysisRecord> = indexed.into_iter().map(|(_, record)| record).collect();

    let from_model =
      records.iter().filter(|record| record.source == AnalysisSource::Model).count();
    info!(
      products = records.len(),
      model = from_model,
      heuristic = records.len() - from_model,
      "analysis batch complete"
    );

    records
  }

  /// Model path for one product, falling back to the heuristics on any failure
  pub async fn analyze_group(&self, group: &ProductGroup) -> AnalysisRecord {
    let result = match self.requester.request_analysis(&group.product_name, &group.rows).await {
      Ok(raw) => normalize(&raw, &group.rows, &group.product_name),
      Err(e) => Err(e),
    };

    match result {
      Ok(record) => {
        debug!(
          product = %group.product_name,
          reviews = group.rows.len(),
          "model analysis accepted"
        );
        record
      }
      Err(e) => {
        warn!(
          product = %group.product_name,
          error = %e,
          "model analysis failed, using heuristics"
        );
        fallback_analysis(&group.product_name, &group.rows)
      }
    }
  }
}
