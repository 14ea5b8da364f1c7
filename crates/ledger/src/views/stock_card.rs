//! Per-item movement history with a running balance.

use chrono::{DateTime, NaiveDate, Utc};
use common::RecordId;
use domain::{Item, ItemId};

use crate::reducer::Movement;
use crate::{LedgerError, LedgerSnapshot, Result};

/// Direction of a stock movement.
///
/// Receipts order before issues recorded on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MovementKind {
    Receipt,
    Issue,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Receipt => "receipt",
            MovementKind::Issue => "issue",
        }
    }
}

/// One effective document touching the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCardEntry {
    pub date: Option<DateTime<Utc>>,
    pub kind: MovementKind,
    /// Report or slip number, or the document id when unnumbered.
    pub reference: String,
    /// Requesting office, for issues.
    pub office: Option<String>,
    pub received: i64,
    pub issued: i64,
    /// Balance after this entry.
    pub balance: i64,
}

impl StockCardEntry {
    fn receipt(date: Option<DateTime<Utc>>, reference: String, quantity: i64) -> Self {
        Self {
            date,
            kind: MovementKind::Receipt,
            reference,
            office: None,
            received: quantity,
            issued: 0,
            balance: 0,
        }
    }

    fn issue(
        date: Option<DateTime<Utc>>,
        reference: String,
        office: String,
        quantity: i64,
    ) -> Self {
        Self {
            date,
            kind: MovementKind::Issue,
            reference,
            office: (!office.is_empty()).then_some(office),
            received: 0,
            issued: quantity,
            balance: 0,
        }
    }

    /// Undated entries sort after every dated one.
    fn sort_key(&self) -> (bool, Option<NaiveDate>, MovementKind, Option<DateTime<Utc>>, &str) {
        (
            self.date.is_none(),
            self.date.map(|d| d.date_naive()),
            self.kind,
            self.date,
            &self.reference,
        )
    }
}

fn reference(number: &str, id: &RecordId) -> String {
    if number.trim().is_empty() {
        id.to_string()
    } else {
        number.to_string()
    }
}

/// The chronological movement history of one expendable item.
///
/// Built with the same status and category gating as the balances
/// report, so the final balance equals the item's balance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCard {
    pub item_id: ItemId,
    pub description: String,
    pub stock_no: String,
    pub unit: String,
    pub entries: Vec<StockCardEntry>,
}

impl StockCard {
    /// Builds the card for an expendable catalog item.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ItemNotFound`] if the item is not in the
    /// catalog or is not expendable.
    pub fn build(snapshot: &LedgerSnapshot, item_id: &ItemId) -> Result<Self> {
        let item = snapshot
            .items
            .iter()
            .find(|item| &item.id == item_id && item.is_expendable())
            .ok_or_else(|| LedgerError::ItemNotFound(item_id.clone()))?;

        let receipts = snapshot
            .acceptances
            .iter()
            .filter(|event| event.is_effective())
            .filter_map(|event| {
                event.quantity_of(item_id).map(|quantity| {
                    let reference = reference(&event.iar_no, &event.id);
                    StockCardEntry::receipt(event.date, reference, quantity)
                })
            });

        let issues = snapshot
            .issuances
            .iter()
            .filter(|event| event.is_effective())
            .filter_map(|event| {
                event.quantity_of(item_id).map(|quantity| {
                    StockCardEntry::issue(
                        event.date,
                        reference(&event.ris_no, &event.id),
                        event.office.clone(),
                        quantity,
                    )
                })
            });

        let mut entries: Vec<StockCardEntry> = receipts.chain(issues).collect();
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut balance: i64 = 0;
        for entry in &mut entries {
            balance = balance
                .saturating_add(entry.received)
                .saturating_sub(entry.issued);
            entry.balance = balance;
        }

        Ok(Self::for_item(item, entries))
    }

    fn for_item(item: &Item, entries: Vec<StockCardEntry>) -> Self {
        Self {
            item_id: item.id.clone(),
            description: item.description.clone(),
            stock_no: item.stock_no.clone(),
            unit: item.unit.clone(),
            entries,
        }
    }

    /// The balance after the last entry.
    pub fn balance(&self) -> i64 {
        self.entries.last().map_or(0, |entry| entry.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpendableBalances, Report};
    use domain::{
        AcceptanceEvent, AcceptanceLineItem, AcceptanceStatus, Category, IssuanceEvent,
        IssuanceLineItem, IssuanceStatus,
    };

    fn at(day: u32) -> DateTime<Utc> {
        format!("2026-03-{day:02}T08:00:00Z").parse().unwrap()
    }

    fn snapshot() -> LedgerSnapshot {
        LedgerSnapshot::new(
            vec![
                Item::new("I1", "Ballpen", "A1", Category::Expendable).with_unit("piece"),
                Item::new("I2", "Stapler", "B1", Category::SemiExpendable),
            ],
            vec![
                AcceptanceEvent::new("a1", AcceptanceStatus::Completed)
                    .with_number("IAR-2026-0001")
                    .with_date(at(1))
                    .with_line(AcceptanceLineItem::new("I1", Category::Expendable, 100)),
                AcceptanceEvent::new("a2", AcceptanceStatus::Completed)
                    .with_number("IAR-2026-0002")
                    .with_date(at(10))
                    .with_line(AcceptanceLineItem::new("I1", Category::Expendable, 20)),
                AcceptanceEvent::new("a3", AcceptanceStatus::Pending)
                    .with_date(at(2))
                    .with_line(AcceptanceLineItem::new("I1", Category::Expendable, 500)),
            ],
            vec![
                IssuanceEvent::new("r1", IssuanceStatus::Posted)
                    .with_number("RIS-2026-0001")
                    .with_office("Accounting")
                    .with_date(at(5))
                    .with_line(IssuanceLineItem::new("I1", 30)),
                IssuanceEvent::new("r2", IssuanceStatus::Posted)
                    .with_number("RIS-2026-0002")
                    .with_date(at(10))
                    .with_line(IssuanceLineItem::new("I1", 15)),
                IssuanceEvent::new("r3", IssuanceStatus::Pending)
                    .with_line(IssuanceLineItem::new("I1", 999)),
            ],
        )
    }

    #[test]
    fn entries_follow_document_dates_with_running_balance() {
        let card = StockCard::build(&snapshot(), &ItemId::new("I1")).unwrap();

        let summary: Vec<(&str, i64, i64, i64)> = card
            .entries
            .iter()
            .map(|e| (e.reference.as_str(), e.received, e.issued, e.balance))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("IAR-2026-0001", 100, 0, 100),
                ("RIS-2026-0001", 0, 30, 70),
                ("IAR-2026-0002", 20, 0, 90),
                ("RIS-2026-0002", 0, 15, 75),
            ]
        );
        assert_eq!(card.entries[1].office.as_deref(), Some("Accounting"));
        assert_eq!(card.entries[3].office, None);
        assert_eq!(card.unit, "piece");
    }

    #[test]
    fn running_balance_saturates() {
        let snapshot = LedgerSnapshot::new(
            vec![Item::new("I1", "Ballpen", "A1", Category::Expendable)],
            vec![
                AcceptanceEvent::new("a1", AcceptanceStatus::Completed)
                    .with_date(at(1))
                    .with_line(AcceptanceLineItem::new("I1", Category::Expendable, i64::MAX))
                    .with_line(AcceptanceLineItem::new("I1", Category::Expendable, 1)),
                AcceptanceEvent::new("a2", AcceptanceStatus::Completed)
                    .with_date(at(2))
                    .with_line(AcceptanceLineItem::new("I1", Category::Expendable, 5)),
            ],
            Vec::new(),
        );

        let card = StockCard::build(&snapshot, &ItemId::new("I1")).unwrap();
        assert_eq!(card.entries[0].received, i64::MAX);
        assert_eq!(card.balance(), i64::MAX);
    }

    #[test]
    fn final_balance_matches_balance_row() {
        let snapshot = snapshot();
        let card = StockCard::build(&snapshot, &ItemId::new("I1")).unwrap();
        let rows = ExpendableBalances::new().compute(&snapshot);

        assert_eq!(card.balance(), rows[0].balance);
    }

    #[test]
    fn receipts_precede_issues_on_the_same_day() {
        let early_issue: DateTime<Utc> = "2026-04-01T07:00:00Z".parse().unwrap();
        let late_receipt: DateTime<Utc> = "2026-04-01T16:00:00Z".parse().unwrap();
        let snapshot = LedgerSnapshot::new(
            vec![Item::new("I1", "Ballpen", "A1", Category::Expendable)],
            vec![AcceptanceEvent::new("a1", AcceptanceStatus::Completed)
                .with_date(late_receipt)
                .with_line(AcceptanceLineItem::new("I1", Category::Expendable, 10))],
            vec![IssuanceEvent::new("r1", IssuanceStatus::Posted)
                .with_date(early_issue)
                .with_line(IssuanceLineItem::new("I1", 4))],
        );

        let card = StockCard::build(&snapshot, &ItemId::new("I1")).unwrap();
        assert_eq!(card.entries[0].kind, MovementKind::Receipt);
        assert_eq!(card.entries[1].kind, MovementKind::Issue);
        assert_eq!(card.entries[1].balance, 6);
    }

    #[test]
    fn undated_entries_come_last_and_use_document_id() {
        let snapshot = LedgerSnapshot::new(
            vec![Item::new("I1", "Ballpen", "A1", Category::Expendable)],
            vec![
                AcceptanceEvent::new("undated", AcceptanceStatus::Completed)
                    .with_line(AcceptanceLineItem::new("I1", Category::Expendable, 1)),
                AcceptanceEvent::new("dated", AcceptanceStatus::Completed)
                    .with_number("IAR-2026-0009")
                    .with_date(at(3))
                    .with_line(AcceptanceLineItem::new("I1", Category::Expendable, 2)),
            ],
            Vec::new(),
        );

        let card = StockCard::build(&snapshot, &ItemId::new("I1")).unwrap();
        assert_eq!(card.entries[0].reference, "IAR-2026-0009");
        assert_eq!(card.entries[1].reference, "undated");
        assert_eq!(card.entries[1].date, None);
    }

    #[test]
    fn lines_for_the_same_item_in_one_document_are_combined() {
        let snapshot = LedgerSnapshot::new(
            vec![Item::new("I1", "Ballpen", "A1", Category::Expendable)],
            Vec::new(),
            vec![IssuanceEvent::new("r1", IssuanceStatus::Posted)
                .with_line(IssuanceLineItem::new("I1", 2))
                .with_line(IssuanceLineItem::new("I1", 3))],
        );

        let card = StockCard::build(&snapshot, &ItemId::new("I1")).unwrap();
        assert_eq!(card.entries.len(), 1);
        assert_eq!(card.entries[0].issued, 5);
        assert_eq!(card.balance(), -5);
    }

    #[test]
    fn unknown_or_non_expendable_items_are_not_found() {
        let snapshot = snapshot();

        assert_eq!(
            StockCard::build(&snapshot, &ItemId::new("nope")).unwrap_err(),
            LedgerError::ItemNotFound(ItemId::new("nope"))
        );
        assert_eq!(
            StockCard::build(&snapshot, &ItemId::new("I2")).unwrap_err(),
            LedgerError::ItemNotFound(ItemId::new("I2"))
        );
    }
}
