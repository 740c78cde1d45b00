//! Result codes stored in the grid.

use serde::{Deserialize, Serialize};

/// Outcome of a single test in a single column.
///
/// The ordinals are part of the stored grid format and must not change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ResultCode {
  /// The test did not run in this column.
  #[default]
  NoResult = 0,
  Pass = 1,
  PassWithErrors = 2,
  PassWithSkips = 3,
  /// The run is still in progress.
  Running = 4,
  CategorizedAbort = 5,
  Unknown = 6,
  Cancel = 7,
  Blocked = 8,
  TimedOut = 9,
  CategorizedFail = 10,
  BuildFail = 11,
  Fail = 12,
  Flaky = 13,
  ToolFail = 14,
  BuildPassed = 15,
}

impl ResultCode {
  /// Decode a raw stored ordinal. The enumeration is closed, so anything
  /// outside it is `None`.
  pub fn from_i32(value: i32) -> Option<Self> {
    let code = match value {
      0 => Self::NoResult,
      1 => Self::Pass,
      2 => Self::PassWithErrors,
      3 => Self::PassWithSkips,
      4 => Self::Running,
      5 => Self::CategorizedAbort,
      6 => Self::Unknown,
      7 => Self::Cancel,
      8 => Self::Blocked,
      9 => Self::TimedOut,
      10 => Self::CategorizedFail,
      11 => Self::BuildFail,
      12 => Self::Fail,
      13 => Self::Flaky,
      14 => Self::ToolFail,
      15 => Self::BuildPassed,
      _ => return None,
    };
    Some(code)
  }

  /// The stored ordinal for this code.
  pub fn as_i32(self) -> i32 {
    self as i32
  }

  /// Whether the run reached a terminal state.
  ///
  /// `NoResult` and `Running` columns have not finished; everything else has.
  /// Diagnostic strings (message, icon) only exist for finished cells.
  pub fn is_finished(self) -> bool {
    !matches!(self, Self::NoResult | Self::Running)
  }
}
