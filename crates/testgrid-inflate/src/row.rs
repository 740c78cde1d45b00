//! Row inflation.
//!
//! Joins one row's expanded results with its diagnostic arrays and all of its
//! metric expanders, producing a stream of per-column cells.

use std::sync::Arc;

use testgrid_state::Row;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cell::Cell;
use crate::error::InflateError;
use crate::metric::expand_metric;
use crate::results::expand_results;

/// Inflate one row into a stream of cells, one per expanded result position.
///
/// The producer runs on its own task and stays at most one cell ahead of the
/// consumer. A decoding failure terminates the stream with the error as its
/// last item; cancellation terminates it silently.
pub fn inflate_row(
  row: Arc<Row>,
  cancel: CancellationToken,
) -> mpsc::Receiver<Result<Cell, InflateError>> {
  let (tx, rx) = mpsc::channel(1);
  tokio::spawn(async move { produce_cells(&row, &cancel, &tx).await });
  rx
}

/// Resolve each metric's effective name once per row.
///
/// A metric's own name wins; an empty name falls back to the row's default
/// name at the metric's index. A metric with neither stays unnamed and its
/// values are dropped.
fn effective_metric_names(row: &Row) -> Vec<Option<String>> {
  row
    .metrics
    .iter()
    .enumerate()
    .map(|(index, metric)| {
      if !metric.name.is_empty() {
        Some(metric.name.clone())
      } else {
        row
          .metric_names
          .get(index)
          .filter(|name| !name.is_empty())
          .cloned()
      }
    })
    .collect()
}

pub(crate) async fn produce_cells(
  row: &Row,
  cancel: &CancellationToken,
  out: &mpsc::Sender<Result<Cell, InflateError>>,
) {
  let names = effective_metric_names(row);
  let mut metrics: Vec<_> = row
    .metrics
    .iter()
    .map(|metric| expand_metric(metric, cancel.clone()))
    .collect();

  // Messages and icons exist only for finished cells; cell ids for all.
  let mut finished = 0;

  for (position, code) in expand_results(&row.results, cancel.clone()).enumerate() {
    let code = match code {
      Ok(code) => code,
      Err(e) => {
        emit(out, cancel, Err(e)).await;
        return;
      }
    };

    let mut cell = Cell {
      result: code,
      ..Default::default()
    };
    if let Some(id) = row.cell_ids.get(position) {
      cell.cell_id = id.clone();
    }
    if code.is_finished() {
      if let Some(message) = row.messages.get(finished) {
        cell.message = message.clone();
      }
      if let Some(icon) = row.icons.get(finished) {
        cell.icon = icon.clone();
      }
      finished += 1;
    }

    // Every metric stream advances exactly once per position, value or not.
    for (metric, name) in metrics.iter_mut().zip(&names) {
      match metric.next() {
        Some(Ok(Some(value))) => {
          if let Some(name) = name {
            // Two metrics resolving to the same name: the later one wins.
            cell.metrics.insert(name.clone(), value);
          }
        }
        Some(Ok(None)) | None => {}
        Some(Err(e)) => {
          emit(out, cancel, Err(e)).await;
          return;
        }
      }
    }

    if !emit(out, cancel, Ok(cell)).await {
      return;
    }
  }
}

/// Send one item unless cancelled or the consumer is gone.
///
/// Biased toward cancellation so a producer never emits past an observed
/// cancel, keeping it within one pending emission of the signal.
async fn emit(
  out: &mpsc::Sender<Result<Cell, InflateError>>,
  cancel: &CancellationToken,
  item: Result<Cell, InflateError>,
) -> bool {
  tokio::select! {
    biased;
    _ = cancel.cancelled() => false,
    sent = out.send(item) => sent.is_ok(),
  }
}
