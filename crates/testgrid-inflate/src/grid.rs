//! Grid inflation.
//!
//! Drives every row's producer in lock-step across columns, applies the time
//! window, and collects aligned inflated columns.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use testgrid_state::Grid;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::cell::{Cell, InflatedColumn};
use crate::error::InflateError;
use crate::row::produce_cells;

/// One row's producer as seen by the column walk.
struct RowStream {
  name: String,
  cells: mpsc::Receiver<Result<Cell, InflateError>>,
  task: JoinHandle<()>,
}

/// Inflate a stored grid into dense columns, newest first.
///
/// Columns whose start time falls outside `[earliest, latest]` are dropped;
/// a `None` bound is unbounded on that side. Any decoding error aborts the
/// whole grid: the first error is returned, every row producer is cancelled
/// and joined, and no partial output escapes. The caller's `cancel` token
/// aborts the walk the same way.
#[instrument(
  name = "grid_inflate",
  skip(grid, cancel),
  fields(columns = grid.columns.len(), rows = grid.rows.len())
)]
pub async fn inflate_grid(
  grid: Arc<Grid>,
  earliest: Option<DateTime<Utc>>,
  latest: Option<DateTime<Utc>>,
  cancel: CancellationToken,
) -> Result<Vec<InflatedColumn>, InflateError> {
  let latest_ms = latest.map(latest_cutoff_ms);
  let earliest_ms = earliest.map(earliest_cutoff_ms);

  let producers = cancel.child_token();
  let mut rows: Vec<RowStream> = (0..grid.rows.len())
    .map(|index| spawn_row(&grid, index, producers.clone()))
    .collect();

  let result = walk_columns(&grid, earliest_ms, latest_ms, &cancel, &mut rows).await;

  // Stop every producer and wait for each to observe the signal, whether the
  // walk completed, stopped at the window edge, or failed.
  producers.cancel();
  let tasks: Vec<_> = rows
    .into_iter()
    .map(|row| {
      drop(row.cells);
      row.task
    })
    .collect();
  for joined in join_all(tasks).await {
    if let Err(e) = joined {
      warn!(error = %e, "row producer did not shut down cleanly");
    }
  }

  match &result {
    Ok(columns) => info!(kept = columns.len(), "grid inflated"),
    Err(e) => error!(error = %e, "grid inflation failed"),
  }

  result
}

/// Upper window cutoff in stored-column milliseconds.
///
/// A `latest` bound keeps every column within its cutoff second: a column one
/// full second past the bound is dropped, one 999ms past is kept.
fn latest_cutoff_ms(latest: DateTime<Utc>) -> f64 {
  (latest.timestamp() * 1000 + 999) as f64
}

/// Lower window cutoff in stored-column milliseconds, exact to the
/// millisecond.
fn earliest_cutoff_ms(earliest: DateTime<Utc>) -> f64 {
  earliest.timestamp_millis() as f64
}

fn spawn_row(grid: &Arc<Grid>, index: usize, cancel: CancellationToken) -> RowStream {
  let name = grid.rows[index].name.clone();
  let (tx, rx) = mpsc::channel(1);
  let grid = Arc::clone(grid);
  let task = tokio::spawn(async move { produce_cells(&grid.rows[index], &cancel, &tx).await });
  RowStream {
    name,
    cells: rx,
    task,
  }
}

async fn walk_columns(
  grid: &Grid,
  earliest_ms: Option<f64>,
  latest_ms: Option<f64>,
  cancel: &CancellationToken,
  rows: &mut [RowStream],
) -> Result<Vec<InflatedColumn>, InflateError> {
  let total = grid.columns.len();
  let mut out = Vec::new();
  let mut truncated = false;

  for (position, column) in grid.columns.iter().enumerate() {
    if cancel.is_cancelled() {
      return Err(InflateError::Cancelled);
    }

    if latest_ms.is_some_and(|cutoff| column.started > cutoff) {
      // Newer than the window: drop the column but still step every row to
      // keep the streams aligned.
      for row in rows.iter_mut() {
        next_cell(row, position, total, cancel).await?;
      }
      continue;
    }

    if earliest_ms.is_some_and(|cutoff| column.started < cutoff) {
      // Columns are sorted newest first, so everything from here on is older
      // than the window.
      truncated = true;
      break;
    }

    let mut cells = HashMap::new();
    for row in rows.iter_mut() {
      let cell = next_cell(row, position, total, cancel).await?;
      if !cell.is_empty() {
        cells.insert(row.name.clone(), cell);
      }
    }
    out.push(InflatedColumn {
      column: column.clone(),
      cells,
    });
  }

  if !truncated {
    // A complete walk must leave every row's stream exactly exhausted.
    for row in rows.iter_mut() {
      match row.cells.recv().await {
        None => {}
        Some(Ok(_)) => {
          let mut cells = total + 1;
          while let Some(Ok(_)) = row.cells.recv().await {
            cells += 1;
          }
          return Err(InflateError::RowLengthMismatch {
            row: row.name.clone(),
            cells,
            columns: total,
          });
        }
        Some(Err(e)) => return Err(e),
      }
    }
  }

  Ok(out)
}

/// Take the next cell from one row's producer.
///
/// A stream that ends mid-walk means the row expanded to fewer cells than the
/// grid has columns, unless the producer stopped because the walk itself was
/// cancelled.
async fn next_cell(
  row: &mut RowStream,
  position: usize,
  columns: usize,
  cancel: &CancellationToken,
) -> Result<Cell, InflateError> {
  match row.cells.recv().await {
    Some(Ok(cell)) => Ok(cell),
    Some(Err(e)) => Err(e),
    None if cancel.is_cancelled() => Err(InflateError::Cancelled),
    None => Err(InflateError::RowLengthMismatch {
      row: row.name.clone(),
      cells: position,
      columns,
    }),
  }
}
