//! HTTP handlers and the state they share.

pub mod documents;
pub mod reports;
pub mod system;

use ledger::{BalanceRow, LedgerEngine, ReportFeed};

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub engine: LedgerEngine<S>,
    /// Live expendable balances over every item; searches filter this.
    pub balances: ReportFeed<BalanceRow>,
    pub store: S,
}
