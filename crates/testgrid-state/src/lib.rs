//! Stored grid schema for CI test history.
//!
//! A grid is the columnar artifact the updater reads and writes: one column
//! per CI run (newest first), one row per test, with per-row streams encoded
//! for compactness. This crate holds the schema records and the result code
//! enumeration; decoding lives in `testgrid-inflate`.

mod grid;
mod result;

pub use grid::{Column, Grid, Metric, Row};
pub use result::ResultCode;
