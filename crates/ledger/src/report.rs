//! Core report trait and the state consumers observe.

use crate::{LedgerError, LedgerSnapshot};

/// A derived view over a complete ledger snapshot.
///
/// Reports are pure: computing twice from the same snapshot yields the
/// same rows, and nothing is cached between computations.
pub trait Report: Send + Sync + 'static {
    /// The row type this report produces.
    type Row: Clone + PartialEq + Send + Sync + 'static;

    /// Returns the name of this report.
    fn name(&self) -> &'static str;

    /// Computes the rows from a snapshot.
    fn compute(&self, snapshot: &LedgerSnapshot) -> Vec<Self::Row>;
}

/// The observable state of a report.
///
/// Rows are only present once every source has loaded and none failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportState<Row> {
    pub rows: Vec<Row>,
    pub loading: bool,
    pub error: Option<LedgerError>,
}

impl<Row> ReportState<Row> {
    /// The state before any source has been read.
    pub fn loading() -> Self {
        Self {
            rows: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// A computed state.
    pub fn ready(rows: Vec<Row>) -> Self {
        Self {
            rows,
            loading: false,
            error: None,
        }
    }

    /// Returns true if the report has rows that can be shown.
    pub fn is_ready(&self) -> bool {
        !self.loading && self.error.is_none()
    }

    /// Returns true if a source failure withheld the rows.
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
