//! Running-inventory aggregation for expendable supplies.
//!
//! This crate provides the read side of the supply ledger:
//! - [`reducer`] status-gates events and sums quantities per item
//! - [`ExpendableBalances`] joins the catalog with those totals into [`BalanceRow`]s
//! - [`StockCard`] lists the movements behind one item's balance
//! - [`LedgerEngine`] reads the three sources and keeps [`ReportFeed`]s current

pub mod engine;
pub mod error;
pub mod reducer;
pub mod report;
pub mod snapshot;
pub mod views;

pub use engine::{LedgerEngine, ReportFeed, evaluate};
pub use error::{LedgerError, Result};
pub use reducer::{Movement, QuantityTotals, issued_totals, received_totals};
pub use report::{Report, ReportState};
pub use snapshot::{LedgerSnapshot, LedgerSources};
pub use views::{
    BalanceRow, ExpendableBalances, MovementKind, StockCard, StockCardEntry, filter_rows,
    project_balances,
};
