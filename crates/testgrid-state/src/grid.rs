//! Stored grid records.
//!
//! Field names are renamed to the stored artifact's schema so a serialized
//! grid round-trips byte-compatible regardless of the framing the driver
//! picks.

use serde::{Deserialize, Serialize};

/// One CI run's slice of the grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Column {
  /// Unique build identifier.
  pub build: String,

  /// Display name for the column header.
  pub name: String,

  /// Start time, milliseconds since the unix epoch.
  pub started: f64,

  /// Additional column header values, in header order.
  pub extra: Vec<String>,

  /// Opaque hotlist id string.
  pub hotlist_ids: String,
}

/// Sparse per-column numeric values attached to a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Metric {
  /// Metric name. Empty means the row's default name list applies.
  pub name: String,

  /// `(start, run)` pairs: `run` consecutive values out of `values` belong
  /// to the columns starting at `start`.
  pub indices: Vec<i32>,

  /// Dense value stream consumed by the index pairs, in order.
  pub values: Vec<f64>,
}

/// One test's history across every column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Row {
  /// Row (test) name, unique within the grid.
  pub name: String,

  /// Run-length encoded result stream, `(code, count)` pairs.
  pub results: Vec<i32>,

  /// Cell ids, one per column position.
  pub cell_ids: Vec<String>,

  /// Messages for finished cells, in finished-cell order.
  pub messages: Vec<String>,

  /// Icons for finished cells, in finished-cell order.
  pub icons: Vec<String>,

  /// Default metric names, positional with `metrics`.
  #[serde(rename = "Metric")]
  pub metric_names: Vec<String>,

  /// Sparse metric streams for this row.
  pub metrics: Vec<Metric>,
}

/// The stored artifact: every column and row of one dashboard tab.
///
/// Columns are sorted by start time descending (newest first); windowed
/// decoding relies on that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Grid {
  pub columns: Vec<Column>,
  pub rows: Vec<Row>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_grid() -> Grid {
    Grid {
      columns: vec![Column {
        build: "run-42".to_string(),
        name: "42".to_string(),
        started: 1234.0,
        extra: vec!["linux".to_string()],
        hotlist_ids: "hot".to_string(),
      }],
      rows: vec![Row {
        name: "suite.test_case".to_string(),
        results: vec![1, 1],
        cell_ids: vec!["cell-1".to_string()],
        messages: vec![String::new()],
        icons: vec![String::new()],
        metric_names: vec!["duration".to_string()],
        metrics: vec![Metric {
          name: String::new(),
          indices: vec![0, 1],
          values: vec![2.5],
        }],
      }],
    }
  }

  #[test]
  fn test_schema_round_trip() {
    let grid = sample_grid();
    let encoded = serde_json::to_string(&grid).expect("grid should serialize");
    let decoded: Grid = serde_json::from_str(&encoded).expect("grid should deserialize");

    assert_eq!(decoded, grid);
    assert_eq!(decoded.columns.len(), grid.columns.len());
    assert_eq!(decoded.rows.len(), grid.rows.len());
    assert_eq!(decoded.rows[0].name, grid.rows[0].name);
    assert_eq!(decoded.rows[0].results, grid.rows[0].results);
  }

  #[test]
  fn test_wire_field_names() {
    let encoded = serde_json::to_value(sample_grid()).unwrap();

    let column = &encoded["Columns"][0];
    assert_eq!(column["Build"], "run-42");
    assert_eq!(column["Started"], 1234.0);
    assert_eq!(column["HotlistIds"], "hot");

    let row = &encoded["Rows"][0];
    assert_eq!(row["CellIds"][0], "cell-1");
    // The default-name list keeps its stored singular name.
    assert_eq!(row["Metric"][0], "duration");
    assert_eq!(row["Metrics"][0]["Indices"][0], 0);
  }

  #[test]
  fn test_missing_fields_default() {
    let decoded: Row = serde_json::from_str(r#"{"Name": "bare"}"#).unwrap();
    assert_eq!(decoded.name, "bare");
    assert!(decoded.results.is_empty());
    assert!(decoded.cell_ids.is_empty());
    assert!(decoded.metrics.is_empty());
  }
}
