//! Grid inflation for stored CI test history.
//!
//! The stored grid interleaves three encodings: run-length results, positional
//! diagnostic strings, and sparse numeric metrics. This crate decodes them
//! back into dense, per-column [`Cell`] records, aligned across rows and
//! restricted to a time window, ready for merging with new build data.
//!
//! Each row inflates on its own producer task; [`inflate_grid`] is the sole
//! consumer, stepping every producer once per column so only one cell per row
//! is in flight at a time. A single cancellation token fans out to every
//! producer, and the grid inflater joins them all before returning.

mod cell;
mod error;
mod grid;
mod metric;
mod results;
mod row;

pub use cell::{Cell, InflatedColumn};
pub use error::InflateError;
pub use grid::inflate_grid;
pub use metric::{expand_metric, MetricExpander};
pub use results::{expand_results, ResultExpander};
pub use row::inflate_row;
