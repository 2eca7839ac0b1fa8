//! Partition rows into per-product batches

use serde::Serialize;
use std::collections::HashMap;

use crate::analysis::types::{RowRecord, PRODUCT_ID, PRODUCT_TITLE, UNKNOWN_PRODUCT};

/// Rows sharing one product key, in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductGroup {
  pub key: String,
  /// Display name resolved from the group's first row
  pub product_name: String,
  pub rows: Vec<RowRecord>,
}

/// Grouping key: id, then title, then the unknown-product literal
pub fn product_key(row: &RowRecord) -> &str {
  row.non_empty(PRODUCT_ID).or_else(|| row.non_empty(PRODUCT_TITLE)).unwrap_or(UNKNOWN_PRODUCT)
}

/// Display name: title, then id, then the unknown-product literal
pub fn resolve_product_name(row: &RowRecord) -> &str {
  row.non_empty(PRODUCT_TITLE).or_else(|| row.non_empty(PRODUCT_ID)).unwrap_or(UNKNOWN_PRODUCT)
}

/// Group rows by product key in a single pass.
///
/// Groups come out in first-seen key order and every row lands in exactly one
/// group, annotated with its own resolved product name.
pub fn group_by_product(rows: Vec<RowRecord>) -> Vec<ProductGroup> {
  let mut positions: HashMap<String, usize> = HashMap::new();
  let mut groups: Vec<ProductGroup> = Vec::new();

  for row in rows {
    let key = product_key(&row).to_string();
    let name = resolve_product_name(&row).to_string();
    let row = row.with_product_name(name.clone());

    match positions.get(&key) {
      Some(&position) => groups[position].rows.push(row),
      None => {
        positions.insert(key.clone(), groups.len());
        groups.push(ProductGroup { key, product_name: name, rows: vec![row] });
      }
    }
  }

  groups
}
