//! Line-oriented CSV reading
//!
//! The dialect is deliberately small: `,` separates fields and every `"`
//! toggles quoted mode, so commas inside quotes survive but doubled quotes
//! (`""`) are not treated as escapes. Malformed lines never fail; they just
//! produce fewer (or odd) fields, which become empty strings downstream.

use tracing::{debug, trace};

use crate::analysis::headers::validate_headers;
use crate::analysis::types::RowRecord;
use crate::error::DocumentError;

/// Split one CSV line into trimmed field values
pub fn parse_line(line: &str) -> Vec<String> {
  let mut fields = Vec::new();
  let mut current = String::new();
  let mut in_quotes = false;

  for ch in line.chars() {
    match ch {
      '"' => in_quotes = !in_quotes,
      ',' if !in_quotes => {
        fields.push(finish_field(&current));
        current.clear();
      }
      _ => current.push(ch),
    }
  }

  fields.push(finish_field(&current));
  fields
}

fn finish_field(raw: &str) -> String {
  let trimmed = raw.trim();
  let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
  let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
  trimmed.to_string()
}

/// Map every line after the header line onto `headers` by position.
///
/// Missing trailing values become `""`; values past the last header are
/// dropped. Blank lines must already be filtered out.
pub fn parse_table<S: AsRef<str>>(lines: &[S], headers: &[String]) -> Vec<RowRecord> {
  lines
    .iter()
    .skip(1)
    .enumerate()
    .map(|(index, line)| {
      let values = parse_line(line.as_ref());
      let mut row = RowRecord::new();
      for (position, header) in headers.iter().enumerate() {
        row.insert(header.clone(), values.get(position).cloned().unwrap_or_default());
      }
      trace!(row = index + 1, fields = ?row.fields(), "parsed CSV row");
      row
    })
    .collect()
}

/// Lower-cased, trimmed column names from the header line
pub fn parse_headers(header_line: &str) -> Vec<String> {
  header_line.split(',').map(|header| header.trim().to_lowercase()).collect()
}

/// Read a whole CSV document: drop blank lines, gate the headers, parse rows.
///
/// A leading byte-order mark (as written by spreadsheet exports) is ignored.
pub fn read_document(text: &str) -> Result<Vec<RowRecord>, DocumentError> {
  let text = text.strip_prefix('\u{feff}').unwrap_or(text);
  let lines: Vec<&str> = text
    .split('\n')
    .map(|line| line.strip_suffix('\r').unwrap_or(line))
    .filter(|line| !line.trim().is_empty())
    .collect();

  if lines.len() < 2 {
    return Err(DocumentError::TooShort);
  }

  let headers = parse_headers(lines[0]);
  validate_headers(headers.as_slice())?;
  debug!(?headers, "CSV headers detected");

  let rows = parse_table(lines.as_slice(), &headers);
  debug!(rows = rows.len(), "CSV rows parsed");
  Ok(rows)
}
