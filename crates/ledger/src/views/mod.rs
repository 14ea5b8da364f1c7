//! Report views over a ledger snapshot.

pub mod expendable_balances;
pub mod stock_card;

pub use expendable_balances::{BalanceRow, ExpendableBalances, filter_rows, project_balances};
pub use stock_card::{MovementKind, StockCard, StockCardEntry};
