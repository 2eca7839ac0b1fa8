//! Mandatory-column gate

use crate::analysis::types::{PRODUCT_ID, PRODUCT_TITLE, REVIEW_TEXT};
use crate::error::MissingColumnError;

/// Reject header sets that cannot produce a usable batch.
///
/// Expects headers already lower-cased. `review_text` is checked first.
pub fn validate_headers<S: AsRef<str>>(headers: &[S]) -> Result<(), MissingColumnError> {
  let has = |column: &str| headers.iter().any(|header| header.as_ref() == column);

  if !has(REVIEW_TEXT) {
    return Err(MissingColumnError::ReviewText);
  }

  if !has(PRODUCT_ID) && !has(PRODUCT_TITLE) {
    return Err(MissingColumnError::ProductColumn);
  }

  Ok(())
}
