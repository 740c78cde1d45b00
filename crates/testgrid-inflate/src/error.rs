//! Inflation errors.

/// Errors that can occur while inflating a stored grid.
///
/// Any of these aborts the enclosing row, and the grid inflater surfaces the
/// first one after cancelling the remaining rows. The variants let the driver
/// decide whether to re-read the grid, skip the configuration, or fail the
/// cycle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InflateError {
  /// Run-length result stream is malformed.
  #[error("malformed result stream: {message}")]
  MalformedResults { message: String },

  /// A sparse metric's index stream is malformed.
  #[error("malformed metric {name:?}: {message}")]
  MalformedMetric { name: String, message: String },

  /// A sparse metric demanded more values than its value stream holds.
  #[error("metric {name:?} ran out of values at position {position}")]
  MetricUnderrun { name: String, position: usize },

  /// A row's expanded result stream disagrees with the column count.
  #[error("row {row:?} expanded to {cells} cells, grid has {columns} columns")]
  RowLengthMismatch {
    row: String,
    cells: usize,
    columns: usize,
  },

  /// Inflation was cancelled.
  #[error("inflation cancelled")]
  Cancelled,
}
