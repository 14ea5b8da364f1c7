//! Status-gated quantity totals per item.

use std::collections::HashMap;

use domain::{AcceptanceEvent, IssuanceEvent, ItemId};

/// A stock movement document: a receipt or an issue.
pub trait Movement {
    /// Returns true if the document's quantities count.
    fn is_effective(&self) -> bool;

    /// The lines that count toward an item's total, as (item, quantity).
    fn counted_lines(&self) -> impl Iterator<Item = (&ItemId, i64)>;

    /// Sums the counted quantity of one item in this document.
    ///
    /// Returns None if no counted line references the item.
    fn quantity_of(&self, item_id: &ItemId) -> Option<i64> {
        self.counted_lines()
            .filter(|(id, _)| *id == item_id)
            .map(|(_, quantity)| quantity)
            .reduce(i64::saturating_add)
    }
}

impl Movement for AcceptanceEvent {
    fn is_effective(&self) -> bool {
        AcceptanceEvent::is_effective(self)
    }

    /// Receiving trusts the category recorded on each line.
    fn counted_lines(&self) -> impl Iterator<Item = (&ItemId, i64)> {
        self.line_items
            .iter()
            .filter(|line| line.is_expendable())
            .map(|line| (&line.item_id, line.quantity))
    }
}

impl Movement for IssuanceEvent {
    fn is_effective(&self) -> bool {
        IssuanceEvent::is_effective(self)
    }

    fn counted_lines(&self) -> impl Iterator<Item = (&ItemId, i64)> {
        self.line_items
            .iter()
            .map(|line| (&line.item_id, line.quantity))
    }
}

/// Summed quantity per item.
///
/// Items whose effective quantity sums to zero are absent; [`get`] returns
/// 0 for them.
///
/// [`get`]: QuantityTotals::get
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantityTotals(HashMap<ItemId, i64>);

impl QuantityTotals {
    /// Returns the total for an item, or 0 if it has none.
    pub fn get(&self, item_id: &ItemId) -> i64 {
        self.0.get(item_id).copied().unwrap_or(0)
    }

    /// Returns true if the item has a non-zero total.
    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.0.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the item ids with a total.
    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.0.keys()
    }
}

impl FromIterator<(ItemId, i64)> for QuantityTotals {
    fn from_iter<I: IntoIterator<Item = (ItemId, i64)>>(iter: I) -> Self {
        let mut totals: HashMap<ItemId, i64> = HashMap::new();
        for (item_id, quantity) in iter {
            let total = totals.entry(item_id).or_insert(0);
            *total = total.saturating_add(quantity);
        }
        totals.retain(|_, total| *total != 0);
        Self(totals)
    }
}

/// Sums counted quantities across the effective documents.
///
/// Sums saturate at the `i64` bounds; within them the result does not
/// depend on document or line order.
pub fn reduce<'a, E, I>(events: I) -> QuantityTotals
where
    E: Movement + 'a,
    I: IntoIterator<Item = &'a E>,
{
    events
        .into_iter()
        .filter(|event| event.is_effective())
        .flat_map(|event| event.counted_lines())
        .map(|(item_id, quantity)| (item_id.clone(), quantity))
        .collect()
}

/// Quantities received per item from completed acceptance reports.
pub fn received_totals(events: &[AcceptanceEvent]) -> QuantityTotals {
    reduce(events)
}

/// Quantities issued per item from posted issue slips.
pub fn issued_totals(events: &[IssuanceEvent]) -> QuantityTotals {
    reduce(events)
}
