//! Inspection and acceptance reports (receipts into stock).

use chrono::{DateTime, Utc};
use common::RecordId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::item::{Category, ItemId};
use crate::serde_ext::{lenient_quantity, null_as_default, skip_invalid};

/// Lifecycle status of an inspection and acceptance report.
///
/// ```text
/// Pending ──┬──► Completed
///           └──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum AcceptanceStatus {
    /// Delivery received, inspection not yet signed off.
    #[default]
    Pending,

    /// Inspected and accepted; quantities are in stock.
    Completed,

    /// Voided; never counted.
    Cancelled,
}

impl AcceptanceStatus {
    /// Returns true if the report's quantities count as received.
    pub fn is_effective(&self) -> bool {
        matches!(self, AcceptanceStatus::Completed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptanceStatus::Pending => "Pending",
            AcceptanceStatus::Completed => "Completed",
            AcceptanceStatus::Cancelled => "Cancelled",
        }
    }

    fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(AcceptanceStatus::Pending),
            "completed" => Some(AcceptanceStatus::Completed),
            "cancelled" | "canceled" => Some(AcceptanceStatus::Cancelled),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for AcceptanceStatus {
    /// Unrecognised or missing labels decode as `Pending`, which never counts.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Self::parse).unwrap_or_default())
    }
}

impl std::fmt::Display for AcceptanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One accepted line of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceLineItem {
    /// Empty when the line names no item; such lines match nothing.
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_id: ItemId,
    /// Category recorded on the report line itself.
    #[serde(default, deserialize_with = "Category::deserialize_lenient")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: i64,
}

impl AcceptanceLineItem {
    pub fn new(item_id: impl Into<ItemId>, category: Category, quantity: i64) -> Self {
        Self {
            item_id: item_id.into(),
            category: Some(category),
            quantity,
        }
    }

    /// Returns true if the line itself is tagged expendable.
    pub fn is_expendable(&self) -> bool {
        self.category.is_some_and(|c| c.is_expendable())
    }
}

/// An inspection and acceptance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceEvent {
    pub id: RecordId,
    /// Report number, e.g. "IAR-2026-0012".
    #[serde(default, deserialize_with = "null_as_default")]
    pub iar_no: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: AcceptanceStatus,
    #[serde(default, deserialize_with = "skip_invalid")]
    pub line_items: Vec<AcceptanceLineItem>,
}

impl AcceptanceEvent {
    /// Creates an undated report with no lines.
    pub fn new(id: impl Into<RecordId>, status: AcceptanceStatus) -> Self {
        Self {
            id: id.into(),
            iar_no: String::new(),
            date: None,
            status,
            line_items: Vec::new(),
        }
    }

    /// Sets the report number.
    pub fn with_number(mut self, iar_no: impl Into<String>) -> Self {
        self.iar_no = iar_no.into();
        self
    }

    /// Sets the report date.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Appends a line.
    pub fn with_line(mut self, line: AcceptanceLineItem) -> Self {
        self.line_items.push(line);
        self
    }

    /// Returns true if the report counts toward received quantities.
    pub fn is_effective(&self) -> bool {
        self.status.is_effective()
    }
}
