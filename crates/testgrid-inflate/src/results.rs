//! Run-length result expansion.

use testgrid_state::ResultCode;
use tokio_util::sync::CancellationToken;

use crate::error::InflateError;

/// Lazily expand a run-length encoded result stream.
///
/// The stored stream is `(code, count)` pairs; expansion yields `count`
/// copies of `code` per pair, in order. The iterator is fused: after an
/// error or cancellation it yields nothing further, and values already
/// yielded remain valid.
pub fn expand_results(codes: &[i32], cancel: CancellationToken) -> ResultExpander<'_> {
  ResultExpander {
    codes,
    cancel,
    current: ResultCode::NoResult,
    remaining: 0,
    total: 0,
    done: false,
  }
}

/// Iterator state for [`expand_results`].
pub struct ResultExpander<'a> {
  codes: &'a [i32],
  cancel: CancellationToken,
  current: ResultCode,
  remaining: i32,
  total: i32,
  done: bool,
}

impl ResultExpander<'_> {
  fn fail(&mut self, message: String) -> Result<ResultCode, InflateError> {
    self.done = true;
    Err(InflateError::MalformedResults { message })
  }
}

impl Iterator for ResultExpander<'_> {
  type Item = Result<ResultCode, InflateError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done || self.cancel.is_cancelled() {
      return None;
    }

    while self.remaining == 0 {
      let codes = self.codes;
      match *codes {
        [] => return None,
        [lone] => return Some(self.fail(format!("odd-length stream, trailing value {lone}"))),
        [code, count, ..] => {
          self.codes = &codes[2..];
          if count < 0 {
            return Some(self.fail(format!("negative count {count} for code {code}")));
          }
          self.total = match self.total.checked_add(count) {
            Some(total) => total,
            None => return Some(self.fail("total count overflows i32".to_string())),
          };
          let Some(code) = ResultCode::from_i32(code) else {
            return Some(self.fail(format!("unknown result code {code}")));
          };
          self.current = code;
          self.remaining = count;
        }
      }
    }

    self.remaining -= 1;
    Some(Ok(self.current))
  }
}
