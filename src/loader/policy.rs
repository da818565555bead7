use crate::error::LoadError;
use tracing::error;

/// Name reported for failures that cannot be attributed to a column.
pub const UNKNOWN_COLUMN: &str = "unknown";

/// One dropped row, with the failing column when it is known.
#[derive(Debug)]
pub struct RowFailure {
    /// Name of the failing column, or [`UNKNOWN_COLUMN`]
    pub column_name: String,
    /// Physical index of the failing column, when attributable
    pub column_index: Option<usize>,
    /// Physical index of the dropped row
    pub row_index: usize,
    /// What went wrong
    pub error: LoadError,
}

impl RowFailure {
    pub(crate) fn new(
        column_name: String,
        column_index: usize,
        row_index: usize,
        error: impl Into<LoadError>,
    ) -> Self {
        Self {
            column_name,
            column_index: Some(column_index),
            row_index,
            error: error.into(),
        }
    }

    /// A failure outside the per-cell coercion path.
    pub(crate) fn unattributed(row_index: usize, error: impl Into<LoadError>) -> Self {
        Self {
            column_name: UNKNOWN_COLUMN.to_owned(),
            column_index: None,
            row_index,
            error: error.into(),
        }
    }
}

/// Strategy invoked once per row that fails to decode.
///
/// Called synchronously, in input row order, on the same path as decoding.
/// Implementations must not fail; a policy is a sink, not a filter.
pub trait RowFailurePolicy {
    fn handle(&mut self, failure: RowFailure);
}

/// Default policy: log the failure and drop the row, keeping no state.
#[derive(Debug, Default)]
pub struct LogAndDrop;

impl RowFailurePolicy for LogAndDrop {
    fn handle(&mut self, failure: RowFailure) {
        log(&failure);
    }
}

/// Policy that keeps every failure in an ordered list for inspection after
/// the session ends, optionally also logging.
#[derive(Debug, Default)]
pub struct Accumulate {
    logging: bool,
    failures: Vec<RowFailure>,
}

impl Accumulate {
    /// Accumulates and logs each failure.
    pub fn new() -> Self {
        Self {
            logging: true,
            failures: Vec::new(),
        }
    }

    /// Accumulates without logging.
    pub fn silent() -> Self {
        Self {
            logging: false,
            failures: Vec::new(),
        }
    }

    /// The collected failures, in input row order.
    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }

    /// Consumes the policy, handing the collected failures to the caller.
    pub fn into_failures(self) -> Vec<RowFailure> {
        self.failures
    }
}

impl RowFailurePolicy for Accumulate {
    fn handle(&mut self, failure: RowFailure) {
        if self.logging {
            log(&failure);
        }
        self.failures.push(failure);
    }
}

fn log(failure: &RowFailure) {
    error!(
        column = %failure.column_name,
        column_index = ?failure.column_index,
        row = failure.row_index,
        "dropped row: {}",
        failure.error,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::coerce::CellError;

    fn failure(row_index: usize) -> RowFailure {
        RowFailure::new(
            "n".to_owned(),
            0,
            row_index,
            CellError::RequiredValueMissing {
                column: "n".to_owned(),
            },
        )
    }

    #[test]
    fn accumulate_keeps_failures_in_order() {
        let mut policy = Accumulate::silent();
        policy.handle(failure(2));
        policy.handle(failure(5));
        policy.handle(failure(9));

        let rows: Vec<usize> = policy.failures().iter().map(|f| f.row_index).collect();
        assert_eq!(rows, vec![2, 5, 9]);
    }

    #[test]
    fn unattributed_failures_carry_the_unknown_marker() {
        let failure = RowFailure::unattributed(
            7,
            CellError::RequiredValueMissing {
                column: "n".to_owned(),
            },
        );
        assert_eq!(failure.column_name, UNKNOWN_COLUMN);
        assert_eq!(failure.column_index, None);
        assert_eq!(failure.row_index, 7);
    }
}
