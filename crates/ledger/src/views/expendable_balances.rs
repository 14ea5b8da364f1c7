//! Running balance of every expendable item that has ever been received.

use std::cmp::Ordering;
use std::collections::HashSet;

use domain::{Item, ItemId};

use crate::reducer::{QuantityTotals, issued_totals, received_totals};
use crate::{LedgerSnapshot, Report};

/// One line of the expendable balances report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub item_id: ItemId,
    pub description: String,
    pub stock_no: String,
    pub unit: String,
    pub total_received: i64,
    pub total_issued: i64,
    /// `total_received - total_issued`; negative when more was issued than received.
    /// Saturates at the `i64` bounds.
    pub balance: i64,
}

impl BalanceRow {
    fn new(item: &Item, total_received: i64, total_issued: i64) -> Self {
        Self {
            item_id: item.id.clone(),
            description: item.description.clone(),
            stock_no: item.stock_no.clone(),
            unit: item.unit.clone(),
            total_received,
            total_issued,
            balance: total_received.saturating_sub(total_issued),
        }
    }

    /// Returns true if more was issued than received.
    pub fn is_over_issued(&self) -> bool {
        self.balance < 0
    }

    /// Returns true if the description or stock number contains `term`,
    /// ignoring case. `term` must already be lowercase.
    fn matches(&self, term: &str) -> bool {
        self.description.to_lowercase().contains(term)
            || self.stock_no.to_lowercase().contains(term)
    }
}

/// Orders rows by description, then stock number, ignoring case.
///
/// An empty stock number sorts first. Item id breaks any remaining tie.
fn compare_rows(a: &BalanceRow, b: &BalanceRow) -> Ordering {
    a.description
        .to_lowercase()
        .cmp(&b.description.to_lowercase())
        .then_with(|| a.stock_no.to_lowercase().cmp(&b.stock_no.to_lowercase()))
        .then_with(|| a.item_id.cmp(&b.item_id))
}

/// Joins the expendable catalog with received and issued totals.
///
/// Items without a positive received total are excluded even if they were
/// issued. Line items
/// referencing ids missing from the catalog are dropped.
pub fn project_balances(
    items: &[Item],
    received: &QuantityTotals,
    issued: &QuantityTotals,
) -> Vec<BalanceRow> {
    let mut rows: Vec<BalanceRow> = items
        .iter()
        .filter(|item| item.is_expendable())
        .map(|item| BalanceRow::new(item, received.get(&item.id), issued.get(&item.id)))
        .filter(|row| row.total_received > 0)
        .collect();
    rows.sort_by(compare_rows);

    let catalog: HashSet<&ItemId> = items.iter().map(|item| &item.id).collect();
    let unresolved = received
        .item_ids()
        .chain(issued.item_ids())
        .filter(|id| !catalog.contains(id))
        .collect::<HashSet<_>>()
        .len();
    if unresolved > 0 {
        tracing::debug!(unresolved, "dropped quantities for items missing from catalog");
    }

    let over_issued = rows.iter().filter(|row| row.is_over_issued()).count();
    if over_issued > 0 {
        tracing::warn!(over_issued, "items with negative balance");
    }

    rows
}

/// Keeps the rows whose description or stock number contains `search`,
/// ignoring case. A missing or blank term keeps every row.
pub fn filter_rows(rows: Vec<BalanceRow>, search: Option<&str>) -> Vec<BalanceRow> {
    let term = match search.map(str::trim) {
        Some(term) if !term.is_empty() => term.to_lowercase(),
        _ => return rows,
    };

    rows.into_iter().filter(|row| row.matches(&term)).collect()
}

/// The expendable running-inventory report.
#[derive(Debug, Clone, Default)]
pub struct ExpendableBalances {
    search: Option<String>,
}

impl ExpendableBalances {
    /// The report over every expendable item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the report to rows matching a search term.
    pub fn with_search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
        }
    }
}

impl Report for ExpendableBalances {
    type Row = BalanceRow;

    fn name(&self) -> &'static str {
        "expendable_balances"
    }

    fn compute(&self, snapshot: &LedgerSnapshot) -> Vec<BalanceRow> {
        let received = received_totals(&snapshot.acceptances);
        let issued = issued_totals(&snapshot.issuances);
        let rows = project_balances(&snapshot.items, &received, &issued);
        filter_rows(rows, self.search.as_deref())
    }
}
