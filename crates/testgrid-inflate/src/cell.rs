//! Inflated output records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use testgrid_state::{Column, ResultCode};

/// The inflated intersection of one row and one column.
///
/// Owned by the consumer once emitted; the inflater keeps no reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
  /// Result of the test in this column.
  pub result: ResultCode,

  /// Cell id at this column position.
  pub cell_id: String,

  /// Diagnostic message. Empty unless the result is finished.
  pub message: String,

  /// Diagnostic icon. Empty unless the result is finished.
  pub icon: String,

  /// Metric values present at this column, keyed by effective metric name.
  pub metrics: HashMap<String, f64>,
}

impl Cell {
  /// True when nothing beyond the defaults is populated.
  ///
  /// Zero cells are elided from column maps to keep them sparse.
  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }
}

/// One surviving column with every non-empty cell keyed by row name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InflatedColumn {
  /// The stored column record, unmodified.
  pub column: Column,

  /// Cells for this column. Rows whose cell is the zero cell are absent.
  pub cells: HashMap<String, Cell>,
}
