//! Sparse metric expansion.

use testgrid_state::Metric;
use tokio_util::sync::CancellationToken;

use crate::error::InflateError;

/// Lazily expand a sparse metric into one optional value per column position.
///
/// Each `(start, run)` pair in the index stream claims the next `run` values
/// for positions `[start, start + run)`; positions no pair covers are absent.
/// The dense image is computed up front so a later pair covering an
/// already-claimed position overwrites it (the last pair wins); emission
/// stays lazy and observes the cancellation token.
pub fn expand_metric(metric: &Metric, cancel: CancellationToken) -> MetricExpander {
  let (dense, failure) = expand(metric);
  MetricExpander {
    dense,
    failure,
    position: 0,
    cancel,
  }
}

fn expand(metric: &Metric) -> (Vec<Option<f64>>, Option<InflateError>) {
  let mut dense: Vec<Option<f64>> = Vec::new();

  if metric.indices.len() % 2 != 0 {
    let failure = malformed(metric, "odd-length index stream".to_string());
    return (dense, Some(failure));
  }

  let mut next_value = 0;
  for pair in metric.indices.chunks_exact(2) {
    let (start, run) = (pair[0], pair[1]);
    if start < 0 || run < 0 {
      let failure = malformed(metric, format!("negative index pair ({start}, {run})"));
      return (dense, Some(failure));
    }
    if run == 0 {
      continue;
    }

    let (start, run) = (start as usize, run as usize);
    let Some(end) = start.checked_add(run) else {
      let failure = malformed(metric, format!("index pair ({start}, {run}) overflows"));
      return (dense, Some(failure));
    };
    if dense.len() < end {
      dense.resize(end, None);
    }

    for position in start..end {
      if next_value == metric.values.len() {
        dense.truncate(position);
        let failure = InflateError::MetricUnderrun {
          name: metric.name.clone(),
          position,
        };
        return (dense, Some(failure));
      }
      dense[position] = Some(metric.values[next_value]);
      next_value += 1;
    }
  }

  (dense, None)
}

fn malformed(metric: &Metric, message: String) -> InflateError {
  InflateError::MalformedMetric {
    name: metric.name.clone(),
    message,
  }
}

/// Iterator state for [`expand_metric`].
///
/// Yields `Ok` for every dense position, then the recorded failure (if any)
/// exactly once, then nothing.
pub struct MetricExpander {
  dense: Vec<Option<f64>>,
  failure: Option<InflateError>,
  position: usize,
  cancel: CancellationToken,
}

impl Iterator for MetricExpander {
  type Item = Result<Option<f64>, InflateError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.cancel.is_cancelled() {
      return None;
    }
    if self.position < self.dense.len() {
      let value = self.dense[self.position];
      self.position += 1;
      return Some(Ok(value));
    }
    self.failure.take().map(Err)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn metric(indices: &[i32], values: &[f64]) -> Metric {
    Metric {
      name: "latency".to_string(),
      indices: indices.to_vec(),
      values: values.to_vec(),
    }
  }

  fn collect(indices: &[i32], values: &[f64]) -> Vec<Option<f64>> {
    expand_metric(&metric(indices, values), CancellationToken::new())
      .map(|v| v.expect("metric should decode"))
      .collect()
  }

  #[test]
  fn test_basically_works() {
    assert!(collect(&[], &[]).is_empty());
  }

  #[test]
  fn test_documented_example_with_values_and_holes() {
    assert_eq!(
      collect(&[0, 2, 6, 4], &[0.1, 0.2, 6.1, 6.2, 6.3, 6.4]),
      vec![
        Some(0.1),
        Some(0.2),
        None,
        None,
        None,
        None,
        Some(6.1),
        Some(6.2),
        Some(6.3),
        Some(6.4),
      ]
    );
  }

  #[test]
  fn test_length_is_largest_covered_position_plus_one() {
    assert_eq!(collect(&[3, 2], &[1.0, 2.0]).len(), 5);
  }

  #[test]
  fn test_zero_run_pairs_are_skipped() {
    assert_eq!(collect(&[5, 0, 0, 1], &[7.0]), vec![Some(7.0)]);
  }

  #[test]
  fn test_overlapping_ranges_last_pair_wins() {
    // Both pairs cover position 1; the second pair's value survives.
    assert_eq!(
      collect(&[0, 2, 1, 1], &[1.0, 2.0, 9.0]),
      vec![Some(1.0), Some(9.0)]
    );
  }

  #[test]
  fn test_value_underrun_terminates_with_error() {
    let mut stream = expand_metric(&metric(&[0, 3], &[1.0]), CancellationToken::new());
    assert_eq!(stream.next().unwrap().unwrap(), Some(1.0));
    assert!(matches!(
      stream.next(),
      Some(Err(InflateError::MetricUnderrun { position: 1, .. }))
    ));
    assert!(stream.next().is_none());
  }

  #[test]
  fn test_odd_index_stream_is_malformed() {
    let mut stream = expand_metric(&metric(&[0, 1, 2], &[1.0]), CancellationToken::new());
    assert!(matches!(
      stream.next(),
      Some(Err(InflateError::MalformedMetric { .. }))
    ));
    assert!(stream.next().is_none());
  }

  #[test]
  fn test_negative_pair_is_malformed() {
    let mut stream = expand_metric(&metric(&[-1, 2], &[1.0]), CancellationToken::new());
    assert!(matches!(
      stream.next(),
      Some(Err(InflateError::MalformedMetric { .. }))
    ));
  }

  #[test]
  fn test_cancellation_stops_the_stream() {
    let cancel = CancellationToken::new();
    let mut stream = expand_metric(&metric(&[0, 3], &[1.0, 2.0, 3.0]), cancel.clone());
    assert_eq!(stream.next().unwrap().unwrap(), Some(1.0));
    cancel.cancel();
    assert!(stream.next().is_none());
  }
}
